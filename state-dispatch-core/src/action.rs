//! Action trait for type-safe state transitions

use std::fmt::Debug;

/// Marker trait for actions that can be dispatched to a store
///
/// Actions represent intents to change state. They should be:
/// - Clone: Actions may be logged, recorded, or replayed by middleware
/// - Debug: For debugging and logging
/// - Send + 'static: So stores can be shared and dispatched into across threads
///
/// Concrete actions are usually enum variants carrying their own payload.
/// Reducers and middleware tell them apart with `match`, and must keep a
/// default arm that leaves the state unchanged for actions they don't handle.
///
/// Use `#[derive(Action)]` from `state-dispatch-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;
}

/// One-line description of an action, used by the action log.
///
/// The default implementation is the `Debug` representation. Override it for
/// actions carrying large payloads.
pub trait ActionSummary: Action {
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}
