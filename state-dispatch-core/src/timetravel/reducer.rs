use super::actions::TimeTravelAction;
use super::state::TimeTravelState;
use crate::error::DispatchError;
use crate::store::Reducer;

/// Reducer of the history store
///
/// - `Record` makes the state current and appends it, evicting the oldest
///   entry once `max_items` states are held
/// - `TravelTo(i)` makes `states[i]` current; an index outside the history
///   is rejected with [`DispatchError::IndexOutOfRange`]
/// - `Reset` makes the last recorded state current
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeTravelReducer<S> {
    max_items: usize,
    _marker: std::marker::PhantomData<fn() -> S>,
}

impl<S> TimeTravelReducer<S> {
    /// A `max_items` of zero is treated as one so history is never empty
    pub fn new(max_items: usize) -> Self {
        Self {
            max_items: max_items.max(1),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }
}

impl<S: Clone> Reducer<TimeTravelState<S>, TimeTravelAction<S>> for TimeTravelReducer<S> {
    fn reduce(
        &self,
        mut state: TimeTravelState<S>,
        action: &TimeTravelAction<S>,
    ) -> Result<TimeTravelState<S>, DispatchError> {
        match action {
            TimeTravelAction::Record(new_state) => {
                while state.states.len() >= self.max_items {
                    state.states.pop_front();
                }
                state.states.push_back(new_state.clone());
                state.current_state = new_state.clone();
            }
            TimeTravelAction::TravelTo(index) => {
                let target = state
                    .states
                    .get(*index)
                    .ok_or(DispatchError::IndexOutOfRange {
                        index: *index,
                        len: state.states.len(),
                    })?;
                state.current_state = target.clone();
            }
            TimeTravelAction::Reset => {
                if let Some(latest) = state.states.back() {
                    state.current_state = latest.clone();
                }
            }
        }
        Ok(state)
    }
}
