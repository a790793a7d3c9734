use std::collections::VecDeque;

/// State of the history store: the current state plus the bounded history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeTravelState<S> {
    pub(super) current_state: S,
    pub(super) states: VecDeque<S>,
}

impl<S: Clone> TimeTravelState<S> {
    /// History holding only `initial_state`, which is also current
    pub fn new(initial_state: S) -> Self {
        Self {
            current_state: initial_state.clone(),
            states: VecDeque::from([initial_state]),
        }
    }
}

impl<S> TimeTravelState<S> {
    pub fn current_state(&self) -> &S {
        &self.current_state
    }

    /// Recorded states, oldest first
    pub fn states(&self) -> &VecDeque<S> {
        &self.states
    }
}
