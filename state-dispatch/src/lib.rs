//! state-dispatch: a middleware-driven state store with time travel
//!
//! Like Redux: state lives in a [`Store`], changes only through dispatched
//! actions, and every dispatch runs through an ordered middleware chain before
//! reaching the reducer. Drop a [`TimeTravelMiddleware`] into the chain to
//! rewind and replay state.
//!
//! # Example
//! ```ignore
//! use state_dispatch::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! enum NameAction {
//!     Set(String),
//!     #[action(time_travel)]
//!     TimeTravel(TimeTravelAction<String>),
//! }
//!
//! let store = Store::builder(String::from("John"))
//!     .middleware(TimeTravelMiddleware::new(String::from("John")))
//!     .reducer(|state, action: &NameAction| match action {
//!         NameAction::Set(name) => name.clone(),
//!         _ => state,
//!     });
//!
//! store.dispatch(NameAction::Set("John Doe".into()))?;
//! store.dispatch(TimeTravelAction::travel_to(0).into())?;
//! assert_eq!(store.state(), "John");
//! ```

// Re-export everything from core
pub use state_dispatch_core::*;

// Re-export derive macros
pub use state_dispatch_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use state_dispatch_core::{Action, ActionSummary, Middleware, Reducer};

    // Pipeline
    pub use state_dispatch_core::{
        compose_middlewares, middleware_fn, ComposedMiddleware, DispatchChain, DispatchError,
        LoggingMiddleware, MonitoringMiddleware, NoopMiddleware, SharedMiddleware,
    };

    // Store
    pub use state_dispatch_core::{Store, StoreBuilder, Unsubscribe};

    // Time travel
    pub use state_dispatch_core::{
        TimeTravelAction, TimeTravelAware, TimeTravelConfig, TimeTravelMiddleware,
    };

    // Debug
    pub use state_dispatch_core::debug::{ActionLoggerConfig, ActionLoggerMiddleware};

    // Derive macros
    pub use state_dispatch_macros::Action;
}
