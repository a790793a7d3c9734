//! Time travel: bounded state history with rewind and reset
//!
//! [`TimeTravelMiddleware`] records every state the rest of the pipeline
//! produces into a private history store and answers two control actions:
//!
//! - [`TimeTravelAction::TravelTo`] jumps to a recorded state
//! - [`TimeTravelAction::Reset`] jumps back to the latest recorded state
//!
//! Navigation never rewrites the history; only new dispatches do.
//!
//! # Example
//!
//! ```
//! use state_dispatch_core::timetravel::{TimeTravelAction, TimeTravelAware, TimeTravelMiddleware};
//! use state_dispatch_core::{Action, Store};
//!
//! #[derive(Clone, Debug)]
//! enum NameAction {
//!     Set(String),
//!     TimeTravel(TimeTravelAction<String>),
//! }
//!
//! impl Action for NameAction {
//!     fn name(&self) -> &'static str {
//!         match self {
//!             NameAction::Set(_) => "Set",
//!             NameAction::TimeTravel(inner) => inner.name(),
//!         }
//!     }
//! }
//!
//! impl TimeTravelAware<String> for NameAction {
//!     fn as_time_travel(&self) -> Option<&TimeTravelAction<String>> {
//!         match self {
//!             NameAction::TimeTravel(inner) => Some(inner),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let store = Store::builder("John".to_string())
//!     .middleware(TimeTravelMiddleware::new("John".to_string()))
//!     .reducer(|state, action: &NameAction| match action {
//!         NameAction::Set(name) => name.clone(),
//!         _ => state,
//!     });
//!
//! store.dispatch(NameAction::Set("John Doe".into())).unwrap();
//! store.dispatch(NameAction::TimeTravel(TimeTravelAction::travel_to(0))).unwrap();
//! assert_eq!(store.state(), "John");
//!
//! store.dispatch(NameAction::TimeTravel(TimeTravelAction::reset())).unwrap();
//! assert_eq!(store.state(), "John Doe");
//! ```

mod actions;
mod middleware;
mod reducer;
mod state;

pub use actions::{TimeTravelAction, TimeTravelAware};
pub use middleware::TimeTravelMiddleware;
pub use reducer::TimeTravelReducer;
pub use state::TimeTravelState;

use serde::{Deserialize, Serialize};

/// Default number of states kept in history
pub const DEFAULT_MAX_ITEMS: usize = 50;

/// Configuration for [`TimeTravelMiddleware`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeTravelConfig {
    /// Maximum number of states kept in history (oldest evicted first)
    pub max_items: usize,
}

impl Default for TimeTravelConfig {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

impl TimeTravelConfig {
    pub fn with_max_items(max_items: usize) -> Self {
        Self { max_items }
    }
}
