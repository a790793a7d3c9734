//! Debug and inspection utilities
//!
//! - **Action Logging**: pattern-filtered action logs written to `tracing`
//!   and, optionally, to an in-memory ring buffer
//!
//! # Action Logging
//!
//! ```ignore
//! use state_dispatch::debug::{ActionLoggerConfig, ActionLoggerMiddleware};
//!
//! // Log everything except the listed patterns
//! let logger = ActionLoggerMiddleware::new(ActionLoggerConfig::new(None, Some("Tick,Render")));
//!
//! let store = Store::builder(AppState::default())
//!     .middleware(logger)
//!     .reducer(reducer);
//! ```

pub mod action_logger;

pub use action_logger::{
    glob_match, ActionLog, ActionLogConfig, ActionLogEntry, ActionLoggerConfig,
    ActionLoggerMiddleware,
};
