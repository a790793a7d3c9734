//! Middleware: interceptors in the dispatch pipeline

use std::fmt;
use std::sync::Arc;

use crate::action::Action;
use crate::chain::DispatchChain;
use crate::error::DispatchError;

/// Middleware trait for intercepting dispatches
///
/// A middleware receives the state the pipeline has produced so far, the
/// action being dispatched, and the [`DispatchChain`] holding the rest of the
/// pipeline. Whatever it returns becomes the input of the middleware that
/// invoked it (or, for the first middleware, the store's next state).
///
/// Implement this trait to add logging, validation, history, or other
/// cross-cutting concerns to a store. For one-off middleware, wrap a closure
/// with [`middleware_fn`].
pub trait Middleware<S, A>: Send + Sync {
    fn dispatch(
        &self,
        state: S,
        action: &A,
        chain: &mut DispatchChain<'_, S, A>,
    ) -> Result<S, DispatchError>;
}

/// A middleware shared between a store and whoever else holds onto it
pub type SharedMiddleware<S, A> = Arc<dyn Middleware<S, A>>;

/// Middleware backed by a closure. See [`middleware_fn`].
#[derive(Clone, Copy)]
pub struct FnMiddleware<F> {
    f: F,
}

impl<F> fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMiddleware").finish_non_exhaustive()
    }
}

/// Turn a closure into a middleware
///
/// ```
/// use state_dispatch_core::middleware_fn;
///
/// // Add one, then hand over to the rest of the chain
/// let add_one = middleware_fn(|state: i32, action: &(), chain| chain.next(state + 1, action));
/// ```
pub fn middleware_fn<S, A, F>(f: F) -> FnMiddleware<F>
where
    F: Fn(S, &A, &mut DispatchChain<'_, S, A>) -> Result<S, DispatchError> + Send + Sync,
{
    FnMiddleware { f }
}

impl<S, A, F> Middleware<S, A> for FnMiddleware<F>
where
    F: Fn(S, &A, &mut DispatchChain<'_, S, A>) -> Result<S, DispatchError> + Send + Sync,
{
    fn dispatch(
        &self,
        state: S,
        action: &A,
        chain: &mut DispatchChain<'_, S, A>,
    ) -> Result<S, DispatchError> {
        (self.f)(state, action, chain)
    }
}

/// A middleware that returns its input and never forwards
///
/// Terminates a chain early. Mostly useful as the explicit end of a
/// composed pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMiddleware;

impl<S, A> Middleware<S, A> for NoopMiddleware {
    fn dispatch(
        &self,
        state: S,
        _action: &A,
        _chain: &mut DispatchChain<'_, S, A>,
    ) -> Result<S, DispatchError> {
        Ok(state)
    }
}

/// Compose multiple middleware into a single middleware
///
/// The members run as a nested chain in the order they were added, each one
/// receiving the next member as its continuation. Once the nested chain has
/// produced a value, it is forwarded to whatever follows the composed
/// middleware in the outer chain.
pub struct ComposedMiddleware<S, A> {
    middlewares: Vec<Arc<dyn Middleware<S, A>>>,
}

impl<S, A> fmt::Debug for ComposedMiddleware<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposedMiddleware")
            .field("middlewares_count", &self.middlewares.len())
            .finish()
    }
}

impl<S, A> Default for ComposedMiddleware<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A> ComposedMiddleware<S, A> {
    /// Create an empty composition
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    /// Add a middleware to the composition
    pub fn add<M: Middleware<S, A> + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Arc::new(middleware));
    }

    /// Number of composed middleware
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl<S, A> Middleware<S, A> for ComposedMiddleware<S, A> {
    fn dispatch(
        &self,
        state: S,
        action: &A,
        chain: &mut DispatchChain<'_, S, A>,
    ) -> Result<S, DispatchError> {
        let folded = DispatchChain::new(&self.middlewares).next(state, action)?;
        chain.next(folded, action)
    }
}

/// Fold a fixed list of middleware into one [`ComposedMiddleware`]
///
/// ```
/// use std::sync::Arc;
/// use state_dispatch_core::{compose_middlewares, middleware_fn, DispatchChain, Middleware};
///
/// let composed = compose_middlewares::<i32, ()>(vec![
///     Arc::new(middleware_fn(|state: i32, action: &(), chain| chain.next(state + 1, action))),
///     Arc::new(middleware_fn(|state: i32, action: &(), chain| chain.next(state * 2, action))),
/// ]);
///
/// let links: Vec<Arc<dyn Middleware<i32, ()>>> = vec![Arc::new(composed)];
/// assert_eq!(DispatchChain::new(&links).next(1, &()), Ok(4));
/// ```
pub fn compose_middlewares<S, A>(
    middlewares: Vec<Arc<dyn Middleware<S, A>>>,
) -> ComposedMiddleware<S, A> {
    ComposedMiddleware { middlewares }
}

/// Middleware that logs dispatches through `tracing`
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    /// Whether to log before the rest of the chain runs
    pub log_before: bool,
    /// Whether to log after the rest of the chain ran
    pub log_after: bool,
}

impl LoggingMiddleware {
    /// Create a new logging middleware with default settings (log after only)
    pub fn new() -> Self {
        Self {
            log_before: false,
            log_after: true,
        }
    }

    /// Create a logging middleware that logs both before and after
    pub fn verbose() -> Self {
        Self {
            log_before: true,
            log_after: true,
        }
    }
}

impl<S, A: Action> Middleware<S, A> for LoggingMiddleware {
    fn dispatch(
        &self,
        state: S,
        action: &A,
        chain: &mut DispatchChain<'_, S, A>,
    ) -> Result<S, DispatchError> {
        if self.log_before {
            tracing::debug!(action = %action.name(), "Dispatching action");
        }

        let result = chain.next(state, action);

        match &result {
            Ok(_) if self.log_after => {
                tracing::debug!(action = %action.name(), "Action processed");
            }
            Err(err) => {
                tracing::warn!(action = %action.name(), error = %err, "Dispatch failed");
            }
            Ok(_) => {}
        }

        result
    }
}

type Hook<S, A> = Box<dyn Fn(&S, &A) + Send + Sync>;

/// Middleware that calls user hooks around the rest of the chain
///
/// `before` sees the incoming state, `after` sees the state the rest of the
/// chain produced. `after` is skipped when the dispatch fails.
pub struct MonitoringMiddleware<S, A> {
    before: Hook<S, A>,
    after: Hook<S, A>,
}

impl<S, A> MonitoringMiddleware<S, A> {
    pub fn new(
        before: impl Fn(&S, &A) + Send + Sync + 'static,
        after: impl Fn(&S, &A) + Send + Sync + 'static,
    ) -> Self {
        Self {
            before: Box::new(before),
            after: Box::new(after),
        }
    }
}

impl<S, A> fmt::Debug for MonitoringMiddleware<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitoringMiddleware").finish_non_exhaustive()
    }
}

impl<S, A> Middleware<S, A> for MonitoringMiddleware<S, A> {
    fn dispatch(
        &self,
        state: S,
        action: &A,
        chain: &mut DispatchChain<'_, S, A>,
    ) -> Result<S, DispatchError> {
        (self.before)(&state, action);
        let next = chain.next(state, action)?;
        (self.after)(&next, action);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Clone, Debug)]
    enum TestAction {
        Bump,
    }

    impl Action for TestAction {
        fn name(&self) -> &'static str {
            "Bump"
        }
    }

    type Link = Arc<dyn Middleware<i32, TestAction>>;

    fn add_one() -> Link {
        Arc::new(middleware_fn(
            |state: i32, action: &TestAction, chain| chain.next(state + 1, action),
        ))
    }

    fn times_two() -> Link {
        Arc::new(middleware_fn(
            |state: i32, action: &TestAction, chain| chain.next(state * 2, action),
        ))
    }

    #[test]
    fn test_noop_keeps_state() {
        let links: Vec<Link> = vec![Arc::new(NoopMiddleware), add_one()];

        assert_eq!(
            DispatchChain::new(&links).next(42, &TestAction::Bump),
            Ok(42)
        );
    }

    #[test]
    fn test_composed_runs_members_in_order() {
        let composed = compose_middlewares(vec![add_one(), times_two()]);
        let links: Vec<Link> = vec![Arc::new(composed), Arc::new(NoopMiddleware)];

        assert_eq!(DispatchChain::new(&links).next(1, &TestAction::Bump), Ok(4));
    }

    #[test]
    fn test_composed_forwards_to_outer_chain() {
        let mut composed: ComposedMiddleware<i32, TestAction> = ComposedMiddleware::new();
        composed.add(middleware_fn(|state: i32, action: &TestAction, chain| {
            chain.next(state + 1, action)
        }));
        assert_eq!(composed.len(), 1);

        let links: Vec<Link> = vec![Arc::new(composed), times_two()];

        // (1 + 1) inside the composition, then * 2 in the outer chain
        assert_eq!(DispatchChain::new(&links).next(1, &TestAction::Bump), Ok(4));
    }

    #[test]
    fn test_empty_composition_forwards() {
        let composed: ComposedMiddleware<i32, TestAction> = ComposedMiddleware::default();
        assert!(composed.is_empty());

        let links: Vec<Link> = vec![Arc::new(composed), add_one()];
        assert_eq!(DispatchChain::new(&links).next(1, &TestAction::Bump), Ok(2));
    }

    #[test]
    fn test_logging_middleware_is_transparent() {
        let links: Vec<Link> = vec![Arc::new(LoggingMiddleware::verbose()), add_one()];

        assert_eq!(DispatchChain::new(&links).next(1, &TestAction::Bump), Ok(2));
    }

    #[test]
    fn test_monitoring_middleware_sees_before_and_after() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let before = seen.clone();
        let after = seen.clone();

        let monitor = MonitoringMiddleware::new(
            move |state: &i32, action: &TestAction| {
                before
                    .lock()
                    .unwrap()
                    .push(format!("before {:?}: {}", action, state));
            },
            move |state: &i32, action: &TestAction| {
                after
                    .lock()
                    .unwrap()
                    .push(format!("after {:?}: {}", action, state));
            },
        );

        let links: Vec<Link> = vec![Arc::new(monitor), add_one()];
        assert_eq!(DispatchChain::new(&links).next(1, &TestAction::Bump), Ok(2));

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["before Bump: 1".to_string(), "after Bump: 2".to_string()]
        );
    }
}
