use std::fmt::Debug;

use crate::action::Action;

/// Actions understood by the time-travel history
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeTravelAction<S> {
    /// Append a state to history.
    ///
    /// Reserved for [`TimeTravelMiddleware`](super::TimeTravelMiddleware),
    /// which synthesizes it after every ordinary dispatch. Dispatching it
    /// through the middleware from outside is a usage violation.
    Record(S),
    /// Make the recorded state at this index current
    TravelTo(usize),
    /// Make the most recently recorded state current again
    Reset,
}

impl<S> TimeTravelAction<S> {
    pub fn travel_to(index: usize) -> Self {
        Self::TravelTo(index)
    }

    pub fn reset() -> Self {
        Self::Reset
    }
}

impl<S: Clone + Debug + Send + 'static> Action for TimeTravelAction<S> {
    fn name(&self) -> &'static str {
        match self {
            TimeTravelAction::Record(_) => "TimeTravelRecord",
            TimeTravelAction::TravelTo(_) => "TimeTravelTo",
            TimeTravelAction::Reset => "TimeTravelReset",
        }
    }
}

/// Action types that can carry [`TimeTravelAction`]s
///
/// Implemented by the application's action enum, usually through a variant
/// wrapping `TimeTravelAction<S>` (`#[action(time_travel)]` with the derive
/// macro).
pub trait TimeTravelAware<S>: Action {
    /// The wrapped time-travel action, if this is one
    fn as_time_travel(&self) -> Option<&TimeTravelAction<S>>;
}

impl<S: Clone + Debug + Send + 'static> TimeTravelAware<S> for TimeTravelAction<S> {
    fn as_time_travel(&self) -> Option<&TimeTravelAction<S>> {
        Some(self)
    }
}
