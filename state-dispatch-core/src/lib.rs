//! Core traits and types for state-dispatch
//!
//! This crate provides the building blocks of a unidirectional state
//! container: a [`Store`] holding a state value, changed only by dispatched
//! [`Action`]s that flow through an ordered chain of [`Middleware`] before
//! reaching the reducer.
//!
//! # Core Concepts
//!
//! - **Action**: Intents that describe state changes
//! - **Store**: State container with reducer, subscribers, selectors and watchers
//! - **Middleware**: Interceptors that observe, transform or short-circuit a dispatch
//! - **DispatchChain**: The single-use handle a middleware calls to continue the pipeline
//! - **Time travel**: Bounded state history with rewind and reset, as a middleware
//!
//! # Basic Example
//!
//! ```ignore
//! use state_dispatch_core::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//!     Decrement,
//! }
//!
//! fn reducer(count: i32, action: &CounterAction) -> i32 {
//!     match action {
//!         CounterAction::Increment => count + 1,
//!         CounterAction::Decrement => count - 1,
//!     }
//! }
//!
//! let store = Store::builder(0)
//!     .middleware(LoggingMiddleware::new())
//!     .reducer(reducer);
//!
//! store.dispatch(CounterAction::Increment)?;
//! assert_eq!(store.state(), 1);
//! ```
//!
//! # Middleware Pattern
//!
//! A middleware decides, by how it uses the chain, where its work happens
//! relative to the rest of the pipeline:
//!
//! ```ignore
//! // Before and after: wrap the rest of the chain
//! let timing = middleware_fn(|state, action: &CounterAction, chain| {
//!     let started = std::time::Instant::now();
//!     let next = chain.next(state, action)?;
//!     tracing::debug!(action = %action.name(), elapsed = ?started.elapsed());
//!     Ok(next)
//! });
//!
//! // Short-circuit: never call the chain
//! let frozen = middleware_fn(|state, _action: &CounterAction, _chain| Ok(state));
//! ```

pub mod action;
pub mod chain;
pub mod debug;
pub mod error;
pub mod middleware;
pub mod store;
pub mod testing;
pub mod timetravel;

// Core trait exports
pub use action::{Action, ActionSummary};
pub use chain::DispatchChain;
pub use error::DispatchError;

// Middleware exports
pub use middleware::{
    compose_middlewares, middleware_fn, ComposedMiddleware, FnMiddleware, LoggingMiddleware,
    Middleware, MonitoringMiddleware, NoopMiddleware, SharedMiddleware,
};

// Store exports
pub use store::{Reducer, Store, StoreBuilder, Unsubscribe};

// Time travel exports
pub use timetravel::{
    TimeTravelAction, TimeTravelAware, TimeTravelConfig, TimeTravelMiddleware,
    TimeTravelReducer, TimeTravelState,
};

// Testing exports
pub use testing::{ActionRecorder, TestHarness};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionSummary};
    pub use crate::chain::DispatchChain;
    pub use crate::error::DispatchError;
    pub use crate::middleware::{
        compose_middlewares, middleware_fn, ComposedMiddleware, LoggingMiddleware, Middleware,
        MonitoringMiddleware, NoopMiddleware, SharedMiddleware,
    };
    pub use crate::store::{Reducer, Store, StoreBuilder, Unsubscribe};
    pub use crate::timetravel::{
        TimeTravelAction, TimeTravelAware, TimeTravelConfig, TimeTravelMiddleware,
    };
}
