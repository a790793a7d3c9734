use std::fmt::{self, Debug};

use super::actions::{TimeTravelAction, TimeTravelAware};
use super::reducer::TimeTravelReducer;
use super::state::TimeTravelState;
use super::TimeTravelConfig;
use crate::chain::DispatchChain;
use crate::error::DispatchError;
use crate::middleware::Middleware;
use crate::store::Store;

/// Middleware recording every produced state into a bounded history
///
/// Owns a private [`Store`] whose state is a [`TimeTravelState`]. Ordinary
/// actions are forwarded down the chain and the resulting state is recorded.
/// `TravelTo` and `Reset` bypass the rest of the chain, reducer included: the
/// history store handles them and its new current state becomes the result.
pub struct TimeTravelMiddleware<S> {
    history: Store<TimeTravelState<S>, TimeTravelAction<S>>,
}

impl<S> TimeTravelMiddleware<S>
where
    S: Clone + Debug + Send + Sync + 'static,
{
    /// History seeded with `initial_state`, keeping the default number of states
    pub fn new(initial_state: S) -> Self {
        Self::with_config(initial_state, TimeTravelConfig::default())
    }

    pub fn with_max_items(initial_state: S, max_items: usize) -> Self {
        Self::with_config(initial_state, TimeTravelConfig::with_max_items(max_items))
    }

    pub fn with_config(initial_state: S, config: TimeTravelConfig) -> Self {
        Self {
            history: Store::with_reducer(
                TimeTravelState::new(initial_state),
                TimeTravelReducer::new(config.max_items),
            ),
        }
    }

    /// The state history currently points at
    pub fn current_state(&self) -> S {
        self.history.state().current_state
    }

    /// Recorded states, oldest first
    pub fn states(&self) -> Vec<S> {
        self.history.state().states.into_iter().collect()
    }

    /// Accessor for the current state that outlives borrows of the middleware
    pub fn current_state_selector(&self) -> impl Fn() -> S + Send + Sync + 'static {
        self.history
            .selector(|history: &TimeTravelState<S>| history.current_state.clone())
    }

    /// Accessor for the recorded states that outlives borrows of the middleware
    pub fn states_selector(&self) -> impl Fn() -> Vec<S> + Send + Sync + 'static {
        self.history
            .selector(|history: &TimeTravelState<S>| history.states.iter().cloned().collect())
    }

    fn record(&self, state: S) -> Result<(), DispatchError> {
        tracing::trace!("Recording state into history");
        self.history.dispatch(TimeTravelAction::Record(state))
    }

    fn navigate(&self, action: &TimeTravelAction<S>) -> Result<S, DispatchError> {
        tracing::trace!(action = ?action, "Time travel");
        self.history.dispatch(action.clone())?;
        Ok(self.current_state())
    }
}

impl<S, A> Middleware<S, A> for TimeTravelMiddleware<S>
where
    S: Clone + Debug + Send + Sync + 'static,
    A: TimeTravelAware<S>,
{
    fn dispatch(
        &self,
        state: S,
        action: &A,
        chain: &mut DispatchChain<'_, S, A>,
    ) -> Result<S, DispatchError> {
        match action.as_time_travel() {
            Some(TimeTravelAction::Record(_)) => Err(DispatchError::UsageViolation(
                "TimeTravelAction::Record is reserved for the time-travel middleware",
            )),
            Some(control) => self.navigate(control),
            None => {
                let next = chain.next(state, action)?;
                self.record(next.clone())?;
                Ok(next)
            }
        }
    }
}

impl<S: Debug> Debug for TimeTravelMiddleware<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeTravelMiddleware")
            .field("history", &self.history)
            .finish()
    }
}
