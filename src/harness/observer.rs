//! Topic notification log
//!
//! Records notifications published by the system under test so scenario
//! actions can assert on them. Each `expect_called` consumes one pending
//! notification; `expect_no_calls` checks that nothing is left over.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tracing::trace;

use super::wait::with_timeout;
use crate::common::{Error, Result};

#[derive(Default)]
struct Inner {
    pending: Mutex<BTreeMap<String, usize>>,
    notify: Notify,
}

/// Cloneable handle; all clones share the same log
#[derive(Clone, Default)]
pub struct ObserverLog {
    inner: Arc<Inner>,
}

impl ObserverLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn pending_map(&self) -> MutexGuard<'_, BTreeMap<String, usize>> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Record one notification for `topic` and wake waiters
    pub fn notify(&self, topic: &str) {
        trace!(topic, "Observer notified");
        *self.pending_map().entry(topic.to_string()).or_default() += 1;
        self.inner.notify.notify_waiters();
    }

    /// Number of unconsumed notifications for `topic`
    pub fn pending(&self, topic: &str) -> usize {
        self.pending_map().get(topic).copied().unwrap_or(0)
    }

    /// Consume one pending notification for `topic`
    pub fn expect_called(&self, topic: &str) -> Result<()> {
        let mut pending = self.pending_map();
        let remaining = match pending.get_mut(topic) {
            Some(count) if *count > 0 => {
                *count -= 1;
                *count
            }
            _ => {
                return Err(Error::assertion(format!(
                    "expected observer notification '{}'",
                    topic
                )))
            }
        };
        if remaining == 0 {
            pending.remove(topic);
        }
        Ok(())
    }

    /// Fail if any notification is pending, clearing them either way
    pub fn expect_no_calls(&self) -> Result<()> {
        let leftover = std::mem::take(&mut *self.pending_map());
        if leftover.is_empty() {
            return Ok(());
        }

        let listed: Vec<String> = leftover
            .iter()
            .map(|(topic, count)| format!("{} x{}", topic, count))
            .collect();
        Err(Error::assertion(format!(
            "unexpected observer notifications: {}",
            listed.join(", ")
        )))
    }

    /// Wait until at least one notification for `topic` is pending
    ///
    /// Does not consume it; follow with [`ObserverLog::expect_called`].
    pub async fn wait_for(&self, topic: &str, timeout: Duration) -> Result<()> {
        with_timeout(timeout, async {
            loop {
                let notified = self.inner.notify.notified();
                if self.pending(topic) > 0 {
                    return Ok(());
                }
                notified.await;
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_called_consumes_one() {
        let log = ObserverLog::new();
        log.notify("getUserMedia:request");
        log.notify("getUserMedia:request");

        log.expect_called("getUserMedia:request").unwrap();
        assert_eq!(log.pending("getUserMedia:request"), 1);
        log.expect_called("getUserMedia:request").unwrap();
        assert!(log.expect_called("getUserMedia:request").is_err());
    }

    #[test]
    fn test_expect_no_calls_lists_and_clears() {
        let log = ObserverLog::new();
        log.notify("recording-device-events");
        log.notify("recording-window-ended");
        log.notify("recording-window-ended");

        let err = log.expect_no_calls().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Assertion failed: unexpected observer notifications: \
             recording-device-events x1, recording-window-ended x2"
        );
        log.expect_no_calls().unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_wakes_on_notify_from_other_task() {
        let log = ObserverLog::new();
        let publisher = log.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            publisher.notify("recording-device-stopped");
        });

        log.wait_for("recording-device-stopped", Duration::from_secs(5))
            .await
            .unwrap();
        handle.await.unwrap();
        log.expect_called("recording-device-stopped").unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_times_out() {
        let log = ObserverLog::new();
        log.notify("other-topic");

        let err = log
            .wait_for("recording-device-stopped", Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout(10)));
    }
}
