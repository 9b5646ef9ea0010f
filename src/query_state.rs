//! Query State - explicit search-lifecycle state with pure transitions.
//!
//! One struct owns everything a search invocation touches: the text being
//! edited, the active column filter, the loading phase and the last error.
//! Transitions are plain methods returning to the caller, so each step is
//! unit-testable without a terminal or a network. Every search is tagged
//! with a generation; a completion carrying an older generation is stale
//! and is discarded instead of applied.

use crate::column_filter::ColumnFilter;

/// User-facing message for any resolver failure. Structured detail goes to
/// the log, never to the banner.
pub const GENERIC_FAILURE: &str = "Failed to process your request. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Loading,
}

#[derive(Debug, Clone)]
pub struct QueryState {
    /// Raw text in the input control.
    pub input: String,
    filter: ColumnFilter,
    error: Option<String>,
    phase: SearchPhase,
    generation: u64,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryState {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            filter: ColumnFilter::none(),
            error: None,
            phase: SearchPhase::Idle,
            generation: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == SearchPhase::Loading
    }

    pub fn filter(&self) -> &ColumnFilter {
        &self.filter
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Enter `Loading`: clears any previous error and bumps the request
    /// generation. Returns the generation tagging this search.
    pub fn begin_search(&mut self) -> u64 {
        self.error = None;
        self.phase = SearchPhase::Loading;
        self.generation += 1;
        self.generation
    }

    /// Apply a resolved token: it becomes the active filter (the empty token
    /// clears it) and the state returns to `Idle`. A stale generation leaves
    /// the state untouched; the return value says whether anything changed.
    pub fn apply_success(&mut self, generation: u64, token: &str) -> bool {
        if generation != self.generation {
            return false;
        }
        self.filter = ColumnFilter::from_token(token);
        self.phase = SearchPhase::Idle;
        true
    }

    /// Apply a failure: the generic message is shown and the active filter
    /// is left exactly as it was. Stale generations are discarded.
    pub fn apply_failure(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.error = Some(GENERIC_FAILURE.to_string());
        self.phase = SearchPhase::Idle;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_search_clears_error_and_loads() {
        let mut state = QueryState::new();
        let generation = state.begin_search();
        assert!(state.apply_failure(generation));
        assert_eq!(state.error(), Some(GENERIC_FAILURE));
        assert!(!state.is_loading());

        state.begin_search();
        assert!(state.error().is_none());
        assert!(state.is_loading());
    }

    #[test]
    fn test_success_sets_filter_and_returns_to_idle() {
        let mut state = QueryState::new();
        let generation = state.begin_search();
        assert!(state.apply_success(generation, "city"));
        assert!(!state.is_loading());
        assert_eq!(state.filter().term(), Some("city"));
    }

    #[test]
    fn test_empty_token_clears_filter() {
        let mut state = QueryState::new();
        let generation = state.begin_search();
        state.apply_success(generation, "city");

        let generation = state.begin_search();
        assert!(state.apply_success(generation, ""));
        assert!(!state.filter().is_active());
    }

    #[test]
    fn test_failure_keeps_filter() {
        let mut state = QueryState::new();
        let generation = state.begin_search();
        state.apply_success(generation, "city");

        let generation = state.begin_search();
        assert!(state.apply_failure(generation));
        assert_eq!(state.filter().term(), Some("city"));
        assert_eq!(state.error(), Some(GENERIC_FAILURE));
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut state = QueryState::new();
        let first = state.begin_search();
        let second = state.begin_search();

        assert!(!state.apply_success(first, "city"));
        assert!(state.is_loading());
        assert!(!state.filter().is_active());

        assert!(state.apply_success(second, "age"));
        assert_eq!(state.filter().term(), Some("age"));
    }

    #[test]
    fn test_stale_failure_is_discarded() {
        let mut state = QueryState::new();
        let first = state.begin_search();
        let second = state.begin_search();

        assert!(!state.apply_failure(first));
        assert!(state.error().is_none());
        assert!(state.apply_success(second, "name"));
    }
}
