//! Action logging middleware with glob filtering and an in-memory ring buffer
//!
//! ```ignore
//! use unistate_core::debug::{ActionLogConfig, ActionLoggerConfig, ActionLoggerMiddleware};
//!
//! // tracing output only, skipping Tick and Render
//! store.with_middleware(ActionLoggerMiddleware::new(ActionLoggerConfig::default()));
//!
//! // also keep the last 100 actions in memory
//! let logger = store.with_middleware(ActionLoggerMiddleware::with_log(ActionLogConfig::default()));
//! store.dispatch(AppAction::Connect)?;
//! for entry in logger.recent(10) {
//!     println!("{} {}", entry.elapsed_display(), entry.summary);
//! }
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::ActionSummary;
use crate::middleware::Middleware;
use crate::store::Store;

fn default_excludes() -> Vec<String> {
    vec!["Tick".to_string(), "Render".to_string()]
}

/// Include/exclude glob patterns over action names.
///
/// `*` matches any run of characters and `?` matches exactly one. An empty
/// include list admits every name; excludes are applied afterwards.
///
/// Deserializable, so it can sit inside an application's config file:
///
/// ```
/// use unistate_core::debug::ActionLoggerConfig;
///
/// let config: ActionLoggerConfig =
///     serde_json::from_str(r#"{"include_patterns": ["Search*"]}"#).unwrap();
/// assert!(config.should_log("SearchAddChar"));
/// assert!(!config.should_log("Connect"));
/// assert_eq!(config.exclude_patterns, vec!["Tick", "Render"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionLoggerConfig {
    /// If non-empty, only log actions matching one of these patterns
    pub include_patterns: Vec<String>,
    /// Skip actions matching any of these patterns
    pub exclude_patterns: Vec<String>,
}

impl Default for ActionLoggerConfig {
    fn default() -> Self {
        Self {
            include_patterns: Vec::new(),
            exclude_patterns: default_excludes(),
        }
    }
}

impl ActionLoggerConfig {
    /// Build from comma-separated pattern lists
    ///
    /// `None` for `exclude` keeps the default excludes (`Tick`, `Render`).
    ///
    /// ```
    /// use unistate_core::debug::ActionLoggerConfig;
    ///
    /// let config = ActionLoggerConfig::new(Some("Search*, Connect"), None);
    /// assert!(config.should_log("SearchAddChar"));
    /// assert!(config.should_log("Connect"));
    /// assert!(!config.should_log("Tick"));
    /// ```
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include_patterns: include.map(split_patterns).unwrap_or_default(),
            exclude_patterns: exclude.map(split_patterns).unwrap_or_else(default_excludes),
        }
    }

    /// Build from explicit pattern lists
    pub fn with_patterns(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self {
            include_patterns: include,
            exclude_patterns: exclude,
        }
    }

    /// Whether an action with this name passes the filter
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

fn split_patterns(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// In-Memory Action Log
// ============================================================================

/// One logged action
#[derive(Debug, Clone)]
pub struct ActionLogEntry {
    /// Action name (from `Action::name()`)
    pub name: &'static str,
    /// One-line summary (from `ActionSummary::summary()`)
    pub summary: String,
    /// When the action was logged
    pub timestamp: Instant,
    /// Monotonic sequence number
    pub sequence: u64,
    /// Whether the dispatch changed the state; `None` until it completes
    pub state_changed: Option<bool>,
}

impl ActionLogEntry {
    /// Create an entry stamped with the current time
    pub fn new(name: &'static str, summary: String, sequence: u64) -> Self {
        Self {
            name,
            summary,
            timestamp: Instant::now(),
            sequence,
            state_changed: None,
        }
    }

    /// Time since the entry was logged
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }

    /// Elapsed time formatted as "2.3s" or "150ms"
    pub fn elapsed_display(&self) -> String {
        let elapsed = self.elapsed();
        if elapsed.as_secs() >= 1 {
            format!("{:.1}s", elapsed.as_secs_f64())
        } else {
            format!("{}ms", elapsed.as_millis())
        }
    }
}

/// Ring buffer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionLogConfig {
    /// Maximum number of entries kept
    pub capacity: usize,
    /// Which actions are stored
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
    /// Default filter with a custom capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    /// Custom capacity and filter
    pub fn new(capacity: usize, filter: ActionLoggerConfig) -> Self {
        Self { capacity, filter }
    }
}

/// Upper bound on entries reserved up front; larger logs grow on demand
const PREALLOCATED_ENTRIES: usize = 256;

/// Bounded log of recent actions; the oldest entry is evicted when full
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
            entries: VecDeque::with_capacity(config.capacity.min(PREALLOCATED_ENTRIES)),
            config,
            next_sequence: 0,
        }
    }

    /// Record `action` if it passes the filter
    pub fn log<A: ActionSummary>(&mut self, action: &A) -> Option<&ActionLogEntry> {
        let name = action.name();
        if self.config.capacity == 0 || !self.config.filter.should_log(name) {
            return None;
        }

        let entry = ActionLogEntry::new(name, action.summary(), self.next_sequence);
        self.next_sequence += 1;

        if self.entries.len() >= self.config.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        self.entries.back()
    }

    /// Set `state_changed` on the newest entry
    pub fn update_last_state_changed(&mut self, changed: bool) {
        if let Some(entry) = self.entries.back_mut() {
            entry.state_changed = Some(changed);
        }
    }

    /// Entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter()
    }

    /// Up to `count` entries, newest first
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

/// Middleware that logs dispatched actions.
///
/// Always logs through `tracing::debug!` when the filter passes. Created with
/// [`with_log`](Self::with_log), it also keeps an [`ActionLog`] whose entries
/// record whether each dispatch changed the state.
#[derive(Debug)]
pub struct ActionLoggerMiddleware {
    config: ActionLoggerConfig,
    log: Option<RefCell<ActionLog>>,
    last_action_logged: Cell<bool>,
    /// Name of the action traced by `before`, consumed by `after`
    traced: Cell<Option<&'static str>>,
    active: bool,
}

impl ActionLoggerMiddleware {
    /// Tracing only, no in-memory storage
    pub fn new(config: ActionLoggerConfig) -> Self {
        Self {
            config,
            log: None,
            last_action_logged: Cell::new(false),
            traced: Cell::new(None),
            active: true,
        }
    }

    /// Tracing plus an in-memory ring buffer
    pub fn with_log(config: ActionLogConfig) -> Self {
        Self {
            config: config.filter.clone(),
            log: Some(RefCell::new(ActionLog::new(config))),
            last_action_logged: Cell::new(false),
            traced: Cell::new(None),
            active: true,
        }
    }

    /// Default filter with the default ring buffer
    pub fn with_default_log() -> Self {
        Self::with_log(ActionLogConfig::default())
    }

    /// No filtering at all, tracing only
    pub fn log_all() -> Self {
        Self::new(ActionLoggerConfig::with_patterns(vec![], vec![]))
    }

    /// Turn the middleware on or off; inactive middleware does nothing
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn config(&self) -> &ActionLoggerConfig {
        &self.config
    }

    /// Copy of the stored entries, oldest first; empty without storage
    pub fn entries(&self) -> Vec<ActionLogEntry> {
        self.log
            .as_ref()
            .map(|log| log.borrow().entries().cloned().collect())
            .unwrap_or_default()
    }

    /// Copy of up to `count` stored entries, newest first
    pub fn recent(&self, count: usize) -> Vec<ActionLogEntry> {
        self.log
            .as_ref()
            .map(|log| log.borrow().recent(count).cloned().collect())
            .unwrap_or_default()
    }

    /// Drop all stored entries
    pub fn clear(&self) {
        if let Some(log) = &self.log {
            log.borrow_mut().clear();
        }
    }
}

impl<A: ActionSummary> Middleware<A> for ActionLoggerMiddleware {
    fn before(&self, _store: &Store<A>, action: &A) -> Option<A> {
        if !self.active {
            return None;
        }

        let name = action.name();
        let traced = self.config.should_log(name).then_some(name);
        if traced.is_some() {
            tracing::debug!(action = %name, "action");
        }
        self.traced.set(traced);

        let logged = self
            .log
            .as_ref()
            .is_some_and(|log| log.borrow_mut().log(action).is_some());
        self.last_action_logged.set(logged);
        None
    }

    fn after(&self, previous: &Value, current: &Value, action: &A) {
        if !self.active {
            return;
        }

        let changed = !std::ptr::eq(previous, current) && previous != current;
        // Report under the name seen by `before`; later before-functions may
        // have rewritten the action
        if let Some(name) = self.traced.take() {
            tracing::debug!(
                action = %name,
                dispatched = %action.name(),
                state_changed = changed,
                "action processed"
            );
        }

        // Only touch the entry this dispatch created
        if self.last_action_logged.replace(false) {
            if let Some(log) = &self.log {
                log.borrow_mut().update_last_state_changed(changed);
            }
        }
    }
}

/// Glob match supporting `*` (any run) and `?` (one character)
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < text.len() {
        match pattern.get(pi) {
            Some(&'*') => {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Action;
    use serde_json::json;

    #[test]
    fn test_glob_match_exact() {
        assert!(glob_match("Tick", "Tick"));
        assert!(!glob_match("Tick", "Tock"));
        assert!(!glob_match("Tick", "TickTock"));
    }

    #[test]
    fn test_glob_match_star() {
        assert!(glob_match("Search*", "SearchAddChar"));
        assert!(glob_match("Search*", "Search"));
        assert!(!glob_match("Search*", "StartSearch"));
        assert!(glob_match("*Search", "StartSearch"));
        assert!(glob_match("*Search*", "StartSearchNow"));
        assert!(glob_match("Connection*Add*", "ConnectionFormAddChar"));
    }

    #[test]
    fn test_glob_match_question() {
        assert!(glob_match("Tick?", "Ticks"));
        assert!(!glob_match("Tick?", "Tick"));
        assert!(!glob_match("Tick?", "Tickss"));
    }

    #[test]
    fn test_config_include_and_exclude() {
        let config = ActionLoggerConfig::new(Some("Did*"), Some("DidFail*"));
        assert!(config.should_log("DidConnect"));
        assert!(!config.should_log("DidFailConnect"));
        assert!(!config.should_log("SearchAddChar"));
    }

    #[test]
    fn test_config_default_excludes_noise() {
        let config = ActionLoggerConfig::default();
        assert!(!config.should_log("Tick"));
        assert!(!config.should_log("Render"));
        assert!(config.should_log("Connect"));
    }

    #[test]
    fn test_config_ignores_blank_patterns() {
        let config = ActionLoggerConfig::new(Some(" , "), Some(""));
        assert!(config.include_patterns.is_empty());
        assert!(config.exclude_patterns.is_empty());
        assert!(config.should_log("Tick"));
    }

    #[test]
    fn test_log_config_deserializes_with_defaults() {
        let config: ActionLogConfig = serde_json::from_str(r#"{"capacity": 5}"#).unwrap();
        assert_eq!(config.capacity, 5);
        assert_eq!(config.filter, ActionLoggerConfig::default());
    }

    #[derive(Clone, Debug)]
    enum TestAction {
        Tick,
        Connect,
    }

    impl Action for TestAction {
        type Kind = &'static str;

        fn kind(&self) -> Self::Kind {
            self.name()
        }

        fn name(&self) -> &'static str {
            match self {
                TestAction::Tick => "Tick",
                TestAction::Connect => "Connect",
            }
        }
    }

    impl ActionSummary for TestAction {}

    #[test]
    fn test_action_log_capacity() {
        let config = ActionLogConfig::new(3, ActionLoggerConfig::with_patterns(vec![], vec![]));
        let mut log = ActionLog::new(config);

        for _ in 0..4 {
            log.log(&TestAction::Connect);
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.entries().next().unwrap().sequence, 1);

        let recent: Vec<_> = log.recent(2).map(|e| e.sequence).collect();
        assert_eq!(recent, vec![3, 2]);
    }

    #[test]
    fn test_action_log_filters() {
        let mut log = ActionLog::default();
        assert!(log.log(&TestAction::Tick).is_none());
        assert!(log.log(&TestAction::Connect).is_some());
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries().next().unwrap().summary, "Connect");
    }

    #[test]
    fn test_middleware_records_state_changes() {
        let mut store = Store::<TestAction>::new();
        let logger = store.with_middleware(ActionLoggerMiddleware::with_default_log());
        store
            .reduce(
                "Connect",
                Some("connected"),
                |_: &Value, _: &TestAction| Some(json!(true)),
            );

        store.dispatch(TestAction::Connect).unwrap();
        store.dispatch(TestAction::Tick).unwrap();
        store.dispatch(TestAction::Connect).unwrap();

        let entries = logger.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].state_changed, Some(true));
        // Second connect rewrites the same value
        assert_eq!(entries[1].state_changed, Some(false));
    }

    #[test]
    fn test_inactive_middleware_logs_nothing() {
        let mut store = Store::<TestAction>::new();
        let logger =
            store.with_middleware(ActionLoggerMiddleware::with_default_log().active(false));

        store.dispatch(TestAction::Connect).unwrap();
        assert!(logger.entries().is_empty());
        assert!(!logger.is_active());
    }

    #[test]
    fn test_huge_configured_capacity_does_not_preallocate() {
        let config: ActionLogConfig =
            serde_json::from_str(r#"{"capacity": 18446744073709551615}"#).unwrap();
        assert_eq!(config.capacity, usize::MAX);

        let mut store = Store::<TestAction>::new();
        let logger = store.with_middleware(ActionLoggerMiddleware::with_log(config));
        store.dispatch(TestAction::Connect).unwrap();

        assert_eq!(logger.entries().len(), 1);
    }

    #[test]
    fn test_rewritten_action_reported_under_traced_name() {
        let mut store = Store::<TestAction>::new();
        let logger = store.with_middleware(ActionLoggerMiddleware::with_default_log());
        store.before(|_: &Store<TestAction>, action: &TestAction| match action {
            TestAction::Tick => Some(TestAction::Connect),
            TestAction::Connect => None,
        });

        // Filtered out as Tick even though reducers see Connect
        store.dispatch(TestAction::Tick).unwrap();
        assert!(logger.entries().is_empty());
        assert_eq!(logger.traced.get(), None);

        Middleware::before(&*logger, &store, &TestAction::Tick);
        assert_eq!(logger.traced.get(), None);

        Middleware::before(&*logger, &store, &TestAction::Connect);
        assert_eq!(logger.traced.get(), Some("Connect"));
        Middleware::after(&*logger, &json!({}), &json!({}), &TestAction::Tick);
        assert_eq!(logger.traced.get(), None);
    }

    #[test]
    fn test_entry_elapsed_display() {
        let entry = ActionLogEntry::new("Test", "Test".to_string(), 0);
        assert!(entry.elapsed_display().ends_with('s'));
    }
}
