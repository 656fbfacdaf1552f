//! Waiting primitives for scenario actions
//!
//! The runner never times anything out itself; actions bound their own
//! waits with these helpers.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, trace};

use crate::common::config::Timeouts;
use crate::common::{Error, Result};

/// Bounded polling parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub max_tries: u32,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            max_tries: 50,
        }
    }
}

impl PollOptions {
    pub fn new(interval: Duration, max_tries: u32) -> Self {
        Self {
            interval,
            max_tries,
        }
    }

    pub fn from_timeouts(timeouts: &Timeouts) -> Self {
        Self {
            interval: timeouts.poll_interval(),
            max_tries: timeouts.poll_max_tries,
        }
    }
}

/// Poll `condition` until it returns true
///
/// The first check happens immediately; at most `max_tries` checks are made
/// (at least one), separated by `interval`.
pub async fn wait_for_condition<F, Fut>(
    mut condition: F,
    message: &str,
    options: PollOptions,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let max_tries = options.max_tries.max(1);

    for attempt in 1..=max_tries {
        if condition().await {
            debug!(attempt, "{}", message);
            return Ok(());
        }
        trace!(attempt, max_tries, "Condition not met yet: {}", message);
        if attempt < max_tries {
            tokio::time::sleep(options.interval).await;
        }
    }

    Err(Error::ConditionTimeout {
        message: message.to_string(),
        tries: max_tries,
    })
}

/// Fail with [`Error::Timeout`] if `future` does not settle within `duration`
pub async fn with_timeout<T, F>(duration: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| Error::Timeout(duration.as_millis() as u64))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_tries: u32) -> PollOptions {
        PollOptions::new(Duration::from_millis(1), max_tries)
    }

    #[tokio::test]
    async fn test_condition_met_on_third_try() {
        let calls = AtomicU32::new(0);

        wait_for_condition(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { n == 3 }
            },
            "third time lucky",
            fast(5),
        )
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_condition_exhausts_tries() {
        let calls = AtomicU32::new(0);

        let err = wait_for_condition(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { false }
            },
            "image loaded",
            fast(4),
        )
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match err {
            Error::ConditionTimeout { message, tries } => {
                assert_eq!(message, "image loaded");
                assert_eq!(tries, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_zero_tries_still_checks_once() {
        let calls = AtomicU32::new(0);
        let _ = wait_for_condition(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { false }
            },
            "once",
            fast(0),
        )
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_with_timeout_passes_through_result() {
        let value = with_timeout(Duration::from_secs(1), async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let err = with_timeout(Duration::from_millis(5), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Timeout(5)));
    }

    #[test]
    fn test_default_matches_config_defaults() {
        assert_eq!(
            PollOptions::default(),
            PollOptions::from_timeouts(&Timeouts::default())
        );
    }
}
