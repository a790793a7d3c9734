//! Errors surfaced by `dispatch`

use thiserror::Error;

/// Failure of a single dispatch.
///
/// Whatever the variant, a failed dispatch leaves the store's state at its
/// pre-dispatch value and no subscriber is notified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// An action reserved for internal bookkeeping was dispatched by a caller.
    #[error("usage violation: {0}")]
    UsageViolation(&'static str),

    /// A time-travel target outside the recorded history.
    #[error("history index {index} out of range (history holds {len} states)")]
    IndexOutOfRange { index: usize, len: usize },

    /// A middleware or reducer dispatched into the store it is running in.
    #[error("re-entrant dispatch into a store that is already dispatching")]
    Reentrant,

    /// Failure raised by user middleware.
    #[error("middleware failed: {0}")]
    Middleware(String),
}

impl DispatchError {
    /// Build a [`DispatchError::Middleware`] from any displayable message.
    pub fn middleware(message: impl Into<String>) -> Self {
        Self::Middleware(message.into())
    }
}
