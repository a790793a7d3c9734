//! Test utilities for state-dispatch stores
//!
//! - [`TestHarness`]: a store wired with an action recorder and a state recorder
//! - [`ActionRecorder`]: middleware that copies every action it sees into a channel
//! - Assertion macros for verifying dispatched actions
//!
//! # Example
//!
//! ```
//! use state_dispatch_core::testing::TestHarness;
//! use state_dispatch_core::{assert_dispatched, Action};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum CounterAction {
//!     Increment,
//!     Decrement,
//! }
//!
//! impl Action for CounterAction {
//!     fn name(&self) -> &'static str {
//!         match self {
//!             CounterAction::Increment => "Increment",
//!             CounterAction::Decrement => "Decrement",
//!         }
//!     }
//! }
//!
//! let mut harness = TestHarness::new(0, |count: i32, action: &CounterAction| match action {
//!     CounterAction::Increment => count + 1,
//!     CounterAction::Decrement => count - 1,
//! });
//!
//! harness.dispatch(CounterAction::Increment).unwrap();
//!
//! let actions = harness.drain_dispatched();
//! assert_dispatched!(actions, CounterAction::Increment);
//! assert_eq!(harness.notified_states(), vec![1]);
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::action::Action;
use crate::chain::DispatchChain;
use crate::error::DispatchError;
use crate::middleware::{Middleware, SharedMiddleware};
use crate::store::{Store, Unsubscribe};

/// Middleware that sends a copy of every action it sees into a channel
///
/// Placed first in a pipeline it sees every dispatch, including the ones a
/// later middleware short-circuits or rejects.
#[derive(Debug, Clone)]
pub struct ActionRecorder<A> {
    tx: mpsc::UnboundedSender<A>,
}

impl<A> ActionRecorder<A> {
    /// Create a recorder and the receiving end of its channel
    pub fn new() -> (Self, mpsc::UnboundedReceiver<A>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl<S, A: Action> Middleware<S, A> for ActionRecorder<A> {
    fn dispatch(
        &self,
        state: S,
        action: &A,
        chain: &mut DispatchChain<'_, S, A>,
    ) -> Result<S, DispatchError> {
        // Receiver gone means nobody is asserting anymore
        let _ = self.tx.send(action.clone());
        chain.next(state, action)
    }
}

/// Generic test harness around a [`Store`]
///
/// Records every dispatched action (drain with
/// [`drain_dispatched`](Self::drain_dispatched)) and every state subscribers
/// were notified with ([`notified_states`](Self::notified_states)).
pub struct TestHarness<S, A: Action> {
    store: Store<S, A>,
    rx: mpsc::UnboundedReceiver<A>,
    notified: Arc<Mutex<Vec<S>>>,
    _subscription: Unsubscribe,
}

impl<S, A> TestHarness<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Action,
{
    /// Create a harness around a store with only a reducer
    pub fn new<F>(state: S, reducer: F) -> Self
    where
        F: Fn(S, &A) -> S + Send + Sync + 'static,
    {
        Self::with_middlewares(state, Vec::new(), reducer)
    }

    /// Create a harness around a store with middleware; the action recorder
    /// runs in front of them
    pub fn with_middlewares<F>(
        state: S,
        middlewares: Vec<SharedMiddleware<S, A>>,
        reducer: F,
    ) -> Self
    where
        F: Fn(S, &A) -> S + Send + Sync + 'static,
    {
        let (recorder, rx) = ActionRecorder::new();
        let mut pipeline: Vec<SharedMiddleware<S, A>> = vec![Arc::new(recorder)];
        pipeline.extend(middlewares);

        let store = Store::with_middlewares(state, pipeline, reducer);

        let notified = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&notified);
        let subscription = store.subscribe(move |state: &S| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(state.clone());
        });

        Self {
            store,
            rx,
            notified,
            _subscription: subscription,
        }
    }

    pub fn store(&self) -> &Store<S, A> {
        &self.store
    }

    pub fn dispatch(&self, action: A) -> Result<(), DispatchError> {
        self.store.dispatch(action)
    }

    /// Current store state
    pub fn state(&self) -> S {
        self.store.state()
    }

    /// Drain all actions dispatched since the last drain
    pub fn drain_dispatched(&mut self) -> Vec<A> {
        let mut actions = Vec::new();
        while let Ok(action) = self.rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    /// States delivered to subscribers so far, in order
    pub fn notified_states(&self) -> Vec<S> {
        self.notified
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Assert that a specific action was dispatched.
///
/// ```ignore
/// let actions = harness.drain_dispatched();
/// assert_dispatched!(actions, Action::Increment);
/// assert_dispatched!(actions, Action::Set(v) if *v > 40);
/// ```
#[macro_export]
macro_rules! assert_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be dispatched, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Assert that a specific action was NOT dispatched.
#[macro_export]
macro_rules! assert_not_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be dispatched, but it was: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Find and return the first dispatched action matching a pattern.
#[macro_export]
macro_rules! find_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().find(|a| matches!(a, $pattern $(if $guard)?))
    };
}

/// Count how many dispatched actions match a pattern.
#[macro_export]
macro_rules! count_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}
