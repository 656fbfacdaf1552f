//! Scenario and run definitions
//!
//! A [`Run`] is assembled before it starts and consumed by
//! [`Run::execute`], so nothing can be appended once scenarios are in flight.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::common::Result;

/// Boxed future returned by closure-based actions
pub type ActionFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// An asynchronous procedure run against the run context
///
/// Scenario actions, the finalizer, cleanup hooks and the after-each check
/// all share this shape.
#[async_trait]
pub trait Action<C: Send>: Send + Sync {
    async fn run(&self, ctx: &mut C) -> Result<()>;
}

/// Adapter turning a boxed-future closure into an [`Action`]
struct FnAction<F>(F);

#[async_trait]
impl<C, F> Action<C> for FnAction<F>
where
    C: Send,
    F: for<'a> Fn(&'a mut C) -> ActionFuture<'a> + Send + Sync,
{
    async fn run(&self, ctx: &mut C) -> Result<()> {
        (self.0)(ctx).await
    }
}

pub(crate) type BoxedAction<C> = Box<dyn Action<C>>;

fn boxed_fn<C, F>(f: F) -> BoxedAction<C>
where
    C: Send,
    F: for<'a> Fn(&'a mut C) -> ActionFuture<'a> + Send + Sync + 'static,
{
    Box::new(FnAction(f))
}

/// One described step of a run
pub struct Scenario<C> {
    pub(crate) description: String,
    pub(crate) action: BoxedAction<C>,
}

impl<C: Send> Scenario<C> {
    /// Create a scenario from a closure returning a boxed future
    ///
    /// ```ignore
    /// Scenario::new("loads page", |ctx| Box::pin(async move {
    ///     ctx.load("https://example.com").await
    /// }))
    /// ```
    pub fn new<F>(description: impl Into<String>, action: F) -> Self
    where
        F: for<'a> Fn(&'a mut C) -> ActionFuture<'a> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            action: boxed_fn(action),
        }
    }

    /// Create a scenario from a type implementing [`Action`]
    pub fn from_action<A>(description: impl Into<String>, action: A) -> Self
    where
        A: Action<C> + 'static,
    {
        Self {
            description: description.into(),
            action: Box::new(action),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl<C> std::fmt::Debug for Scenario<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// An ordered list of scenarios plus its finalization hooks
pub struct Run<C> {
    pub(crate) name: String,
    pub(crate) scenarios: Vec<Scenario<C>>,
    pub(crate) finalize: Option<BoxedAction<C>>,
    pub(crate) cleanups: Vec<BoxedAction<C>>,
    pub(crate) after_each: Option<BoxedAction<C>>,
}

impl<C: Send> Run<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scenarios: Vec::new(),
            finalize: None,
            cleanups: Vec::new(),
            after_each: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a scenario (builder form)
    pub fn scenario(mut self, scenario: Scenario<C>) -> Self {
        self.scenarios.push(scenario);
        self
    }

    /// Append a scenario
    pub fn push(&mut self, scenario: Scenario<C>) {
        self.scenarios.push(scenario);
    }

    /// Set the finalizer, replacing any previous one
    ///
    /// Invoked exactly once after the last scenario settles, on both the
    /// success and the failure path.
    pub fn finalize<F>(mut self, finalize: F) -> Self
    where
        F: for<'a> Fn(&'a mut C) -> ActionFuture<'a> + Send + Sync + 'static,
    {
        self.finalize = Some(boxed_fn(finalize));
        self
    }

    /// Set the finalizer from an [`Action`] implementation
    pub fn finalize_with<A>(mut self, finalize: A) -> Self
    where
        A: Action<C> + 'static,
    {
        self.finalize = Some(Box::new(finalize));
        self
    }

    /// Register an extra cleanup hook
    ///
    /// Cleanup hooks run after the finalizer, most recently registered first.
    pub fn register_cleanup<F>(mut self, cleanup: F) -> Self
    where
        F: for<'a> Fn(&'a mut C) -> ActionFuture<'a> + Send + Sync + 'static,
    {
        self.cleanups.push(boxed_fn(cleanup));
        self
    }

    /// Register an extra cleanup hook from an [`Action`] implementation
    pub fn register_cleanup_with<A>(mut self, cleanup: A) -> Self
    where
        A: Action<C> + 'static,
    {
        self.cleanups.push(Box::new(cleanup));
        self
    }

    /// Check run after every scenario that succeeded
    ///
    /// A failing check fails the scenario it follows.
    pub fn after_each<F>(mut self, check: F) -> Self
    where
        F: for<'a> Fn(&'a mut C) -> ActionFuture<'a> + Send + Sync + 'static,
    {
        self.after_each = Some(boxed_fn(check));
        self
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Scenario descriptions in run order
    pub fn descriptions(&self) -> impl Iterator<Item = &str> {
        self.scenarios.iter().map(|s| s.description.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait]
    impl Action<u32> for Noop {
        async fn run(&self, ctx: &mut u32) -> Result<()> {
            *ctx += 1;
            Ok(())
        }
    }

    #[test]
    fn test_run_keeps_insertion_order() {
        let mut run = Run::<u32>::new("order")
            .scenario(Scenario::from_action("first", Noop))
            .scenario(Scenario::<u32>::new("second", |_| Box::pin(async { Ok(()) })));
        run.push(Scenario::from_action("third", Noop));

        let descriptions: Vec<&str> = run.descriptions().collect();
        assert_eq!(descriptions, vec!["first", "second", "third"]);
        assert_eq!(run.len(), 3);
        assert!(!run.is_empty());
    }

    #[test]
    fn test_scenario_debug_shows_description() {
        let scenario = Scenario::<u32>::from_action("frame 1 prompt", Noop);
        assert!(format!("{:?}", scenario).contains("frame 1 prompt"));
    }
}
