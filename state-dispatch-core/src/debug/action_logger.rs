//! Action logging with pattern-based filtering and in-memory storage
//!
//! [`ActionLoggerMiddleware`] sits in a store's pipeline and reports every
//! dispatched action whose name passes the include/exclude glob patterns. It
//! writes to `tracing` and, optionally, to an [`ActionLog`] ring buffer that
//! also remembers whether each action changed the state.
//!
//! # Example
//!
//! ```ignore
//! use state_dispatch::debug::{ActionLogConfig, ActionLoggerMiddleware};
//! use state_dispatch::Store;
//! use std::sync::Arc;
//!
//! let logger = Arc::new(ActionLoggerMiddleware::with_log(ActionLogConfig::default()));
//! let store = Store::builder(AppState::default())
//!     .shared_middleware(logger.clone())
//!     .reducer(reducer);
//!
//! store.dispatch(AppAction::Connect)?;
//!
//! if let Some(log) = logger.log() {
//!     for entry in log.recent(10) {
//!         println!("#{} {}: {:?}", entry.sequence, entry.summary, entry.state_changed);
//!     }
//! }
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::action::ActionSummary;
use crate::chain::DispatchChain;
use crate::error::DispatchError;
use crate::middleware::Middleware;

fn split_patterns(patterns: &str) -> Vec<String> {
    patterns
        .split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Configuration for action logging with glob pattern filtering.
///
/// The default config logs every action.
///
/// Patterns support:
/// - `*` matches any sequence of characters
/// - `?` matches any single character
/// - Literal text matches exactly
///
/// # Examples
///
/// - `TimeTravel*` matches TimeTravelTo, TimeTravelReset
/// - `Did*` matches DidConnect, DidLoad, etc.
/// - `*Error*` matches any action containing "Error"
/// - `Tick` matches only Tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionLoggerConfig {
    /// If non-empty, only log actions matching these patterns
    pub include_patterns: Vec<String>,
    /// Exclude actions matching these patterns (applied after include)
    pub exclude_patterns: Vec<String>,
}

impl ActionLoggerConfig {
    /// Create a new config from comma-separated pattern strings
    ///
    /// # Arguments
    /// - `include`: comma-separated glob patterns (or None for all)
    /// - `exclude`: comma-separated glob patterns (or None to exclude nothing)
    ///
    /// # Example
    /// ```
    /// use state_dispatch_core::debug::ActionLoggerConfig;
    ///
    /// let config = ActionLoggerConfig::new(Some("TimeTravel*,Set"), Some("Tick,Render"));
    /// assert!(config.should_log("TimeTravelReset"));
    /// assert!(config.should_log("Set"));
    /// assert!(!config.should_log("Tick"));
    /// ```
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include_patterns: include.map(split_patterns).unwrap_or_default(),
            exclude_patterns: exclude.map(split_patterns).unwrap_or_default(),
        }
    }

    /// Create a config with specific pattern vectors
    pub fn with_patterns(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self {
            include_patterns: include,
            exclude_patterns: exclude,
        }
    }

    /// Check if an action name should be logged based on include/exclude patterns
    pub fn should_log(&self, action_name: &str) -> bool {
        let included = self.include_patterns.is_empty()
            || self
                .include_patterns
                .iter()
                .any(|p| glob_match(p, action_name));

        included
            && !self
                .exclude_patterns
                .iter()
                .any(|p| glob_match(p, action_name))
    }
}

// ============================================================================
// In-Memory Action Log
// ============================================================================

/// An entry in the action log
#[derive(Debug, Clone)]
pub struct ActionLogEntry {
    /// Action name (from Action::name())
    pub name: &'static str,
    /// Summary representation (from ActionSummary::summary())
    pub summary: String,
    /// Timestamp when the action was logged
    pub timestamp: Instant,
    /// Sequence number for ordering
    pub sequence: u64,
    /// Whether the dispatch changed the state. `None` until the dispatch
    /// completes, and for dispatches that failed.
    pub state_changed: Option<bool>,
}

impl ActionLogEntry {
    pub fn new(name: &'static str, summary: String, sequence: u64) -> Self {
        Self {
            name,
            summary,
            timestamp: Instant::now(),
            sequence,
            state_changed: None,
        }
    }
}

/// Configuration for the action log ring buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionLogConfig {
    /// Maximum number of entries to keep
    pub capacity: usize,
    pub filter: ActionLoggerConfig,
}

impl Default for ActionLogConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            filter: ActionLoggerConfig::default(),
        }
    }
}

impl ActionLogConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    pub fn new(capacity: usize, filter: ActionLoggerConfig) -> Self {
        Self { capacity, filter }
    }
}

/// In-memory ring buffer of recent actions
///
/// Older entries are discarded once capacity is reached.
#[derive(Debug, Clone)]
pub struct ActionLog {
    entries: VecDeque<ActionLogEntry>,
    config: ActionLogConfig,
    next_sequence: u64,
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new(ActionLogConfig::default())
    }
}

impl ActionLog {
    pub fn new(config: ActionLogConfig) -> Self {
        Self {
            entries: VecDeque::with_capacity(config.capacity),
            config,
            next_sequence: 0,
        }
    }

    /// Log an action (if it passes the filter)
    ///
    /// Returns the sequence number of the new entry, None if filtered out.
    pub fn log<A: ActionSummary>(&mut self, action: &A) -> Option<u64> {
        let name = action.name();
        if self.config.capacity == 0 || !self.config.filter.should_log(name) {
            return None;
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        if self.entries.len() >= self.config.capacity {
            self.entries.pop_front();
        }
        self.entries
            .push_back(ActionLogEntry::new(name, action.summary(), sequence));

        Some(sequence)
    }

    /// Record the outcome of the dispatch that produced entry `sequence`
    ///
    /// Does nothing if the entry was already evicted.
    pub fn set_state_changed(&mut self, sequence: u64, changed: bool) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .rev()
            .find(|entry| entry.sequence == sequence)
        {
            entry.state_changed = Some(changed);
        }
    }

    /// Get all entries (oldest first)
    pub fn entries(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter()
    }

    /// Get the most recent N entries (newest first)
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter().rev().take(count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn config(&self) -> &ActionLogConfig {
        &self.config
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Middleware that logs actions with configurable pattern filtering.
///
/// Supports two modes:
/// - **Tracing only** (default): logs via `tracing::debug!()`
/// - **With storage**: also stores entries in an [`ActionLog`]
///
/// The middleware always forwards to the rest of the chain; it never alters
/// the state.
#[derive(Debug)]
pub struct ActionLoggerMiddleware {
    config: ActionLoggerConfig,
    log: Option<Mutex<ActionLog>>,
    /// When false, the middleware only forwards
    active: bool,
}

impl ActionLoggerMiddleware {
    /// Tracing only, no in-memory storage
    pub fn new(config: ActionLoggerConfig) -> Self {
        Self {
            config,
            log: None,
            active: true,
        }
    }

    /// Tracing plus in-memory storage
    pub fn with_log(config: ActionLogConfig) -> Self {
        Self {
            config: config.filter.clone(),
            log: Some(Mutex::new(ActionLog::new(config))),
            active: true,
        }
    }

    pub fn with_default_log() -> Self {
        Self::with_log(ActionLogConfig::default())
    }

    /// No filtering, tracing only
    pub fn log_all() -> Self {
        Self::new(ActionLoggerConfig::with_patterns(vec![], vec![]))
    }

    /// Set whether the middleware is active.
    ///
    /// ```ignore
    /// let logger = ActionLoggerMiddleware::log_all()
    ///     .active(args.debug);  // Only log if --debug flag passed
    /// ```
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Snapshot of the action log (if storage is enabled)
    pub fn log(&self) -> Option<ActionLog> {
        self.log
            .as_ref()
            .map(|log| log.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    /// Empty the action log
    pub fn clear_log(&self) {
        if let Some(log) = &self.log {
            log.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
    }

    pub fn config(&self) -> &ActionLoggerConfig {
        &self.config
    }

    fn store_entry<A: ActionSummary>(&self, action: &A) -> Option<u64> {
        self.log
            .as_ref()
            .and_then(|log| log.lock().unwrap_or_else(PoisonError::into_inner).log(action))
    }

    fn store_outcome(&self, sequence: u64, changed: bool) {
        if let Some(log) = &self.log {
            log.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .set_state_changed(sequence, changed);
        }
    }
}

impl<S, A> Middleware<S, A> for ActionLoggerMiddleware
where
    S: Clone + PartialEq,
    A: ActionSummary,
{
    fn dispatch(
        &self,
        state: S,
        action: &A,
        chain: &mut DispatchChain<'_, S, A>,
    ) -> Result<S, DispatchError> {
        if !self.active {
            return chain.next(state, action);
        }

        let name = action.name();
        if self.config.should_log(name) {
            tracing::debug!(action = %name, "action");
        }

        let Some(sequence) = self.store_entry(action) else {
            return chain.next(state, action);
        };

        let before = state.clone();
        let next = chain.next(state, action)?;
        self.store_outcome(sequence, before != next);
        Ok(next)
    }
}

/// Simple glob pattern matching supporting `*` and `?`.
///
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    // Position of the last `*` seen, and the text position it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < text.len() {
        match pattern.get(pi) {
            Some('*') => {
                backtrack = Some((pi, ti));
                pi += 1;
            }
            Some(&c) if c == '?' || c == text[ti] => {
                pi += 1;
                ti += 1;
            }
            _ => match backtrack {
                Some((star_pi, star_ti)) => {
                    pi = star_pi + 1;
                    ti = star_ti + 1;
                    backtrack = Some((star_pi, star_ti + 1));
                }
                None => return false,
            },
        }
    }

    pattern[pi..].iter().all(|&c| c == '*')
}
