use crate::debounce::Debouncer;
use crate::keys::{KeyListeners, Listener, Subscription};
use popcorn_models::MovieSummary;
use popcorn_sources::SourceError;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Why the result list is replaced by an error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFailure {
    Transport,
    NotFound,
}

impl SearchFailure {
    pub fn message(&self) -> &'static str {
        match self {
            SearchFailure::Transport => "Something went wrong with fetching movies.",
            SearchFailure::NotFound => "Movie Not Found",
        }
    }
}

impl fmt::Display for SearchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchViewState {
    /// Effective term is empty: no results, no error.
    Idle,
    Loading,
    Ready(Vec<MovieSummary>),
    Failed(SearchFailure),
}

/// Handle for one issued search. Only the ticket with the latest generation
/// may change state when its response arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub generation: u64,
    pub term: String,
}

/// Owns the query text, its debounced effective term and the result view.
pub struct SearchController {
    query: String,
    effective: String,
    state: SearchViewState,
    debounce: Debouncer<String>,
    generation: u64,
    focused: bool,
    _focus_listener: Subscription,
}

impl SearchController {
    pub fn new(window: Duration, keys: &KeyListeners) -> Self {
        Self {
            query: String::new(),
            effective: String::new(),
            state: SearchViewState::Idle,
            debounce: Debouncer::new(window),
            generation: 0,
            focused: false,
            _focus_listener: keys.subscribe(Listener::FocusSearch),
        }
    }

    /// Text currently shown in the search input.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Debounced term that last drove a search.
    pub fn effective_term(&self) -> &str {
        &self.effective
    }

    pub fn state(&self) -> &SearchViewState {
        &self.state
    }

    pub fn results(&self) -> &[MovieSummary] {
        match &self.state {
            SearchViewState::Ready(results) => results,
            _ => &[],
        }
    }

    pub fn failure(&self) -> Option<&SearchFailure> {
        match &self.state {
            SearchViewState::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SearchViewState::Loading)
    }

    pub fn contains_result(&self, id: &str) -> bool {
        self.results().iter().any(|m| m.id == id)
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    pub fn has_pending_commit(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Echo `text` immediately and schedule it as the effective term once the
    /// input has been quiet for the debounce window.
    pub fn set_query(&mut self, text: impl Into<String>, now: Instant) {
        let text = text.into();
        self.query = text.clone();
        self.debounce.schedule(text, now);
    }

    /// Commit the pending text if its window has elapsed.
    pub fn poll_debounce(&mut self, now: Instant) -> Option<SearchTicket> {
        let term = self.debounce.take_due(now)?;
        self.commit(term)
    }

    /// Make `term` the effective term right away, dropping any pending commit.
    ///
    /// Returns the ticket for the request the caller must issue, or `None`
    /// when the term is empty.
    pub fn commit(&mut self, term: impl Into<String>) -> Option<SearchTicket> {
        self.debounce.cancel();
        self.effective = term.into();
        self.generation += 1;

        if self.effective.is_empty() {
            debug!("Search cleared");
            self.state = SearchViewState::Idle;
            return None;
        }

        debug!(generation = self.generation, term = %self.effective, "Search issued");
        self.state = SearchViewState::Loading;
        Some(SearchTicket {
            generation: self.generation,
            term: self.effective.clone(),
        })
    }

    /// Apply a response. Returns `false` when the ticket is stale and the
    /// response was ignored.
    pub fn apply(&mut self, ticket: &SearchTicket, outcome: Result<Vec<MovieSummary>, SourceError>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                latest = self.generation,
                term = %ticket.term,
                "Ignoring stale search response"
            );
            return false;
        }

        self.state = match outcome {
            Ok(results) => {
                debug!(term = %ticket.term, count = results.len(), "Search ready");
                SearchViewState::Ready(results)
            }
            Err(SourceError::NotFound(message)) => {
                debug!(term = %ticket.term, "No matches: {}", message);
                SearchViewState::Failed(SearchFailure::NotFound)
            }
            Err(e) => {
                warn!(term = %ticket.term, "Search failed: {}", e);
                SearchViewState::Failed(SearchFailure::Transport)
            }
        };
        true
    }

    /// Enter pressed outside the input: focus it and clear the displayed text.
    /// The effective term is left alone and nothing new is searched.
    pub fn on_enter(&mut self) {
        if self.focused {
            return;
        }
        self.focused = true;
        self.query.clear();
        // A commit still waiting on the window is dropped as well: no search
        // runs for text that was just cleared from the input.
        self.debounce.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(500);

    fn movie(id: &str, title: &str) -> MovieSummary {
        MovieSummary {
            id: id.to_string(),
            title: title.to_string(),
            year: "2010".to_string(),
            poster_url: String::new(),
        }
    }

    fn controller(keys: &KeyListeners) -> SearchController {
        SearchController::new(WINDOW, keys)
    }

    #[test]
    fn test_set_query_echoes_immediately_but_searches_after_window() {
        let keys = KeyListeners::new();
        let mut search = controller(&keys);
        let start = Instant::now();

        search.set_query("coco", start);
        assert_eq!(search.query(), "coco");
        assert_eq!(search.effective_term(), "");
        assert_eq!(search.state(), &SearchViewState::Idle);
        assert_eq!(search.poll_debounce(start + Duration::from_millis(100)), None);

        let ticket = search.poll_debounce(start + WINDOW).unwrap();
        assert_eq!(ticket.term, "coco");
        assert_eq!(search.effective_term(), "coco");
        assert!(search.is_loading());
    }

    #[test]
    fn test_only_last_rapid_query_becomes_effective() {
        let keys = KeyListeners::new();
        let mut search = controller(&keys);
        let start = Instant::now();

        let mut tickets = Vec::new();
        for (i, text) in ["m", "ma", "mat", "matrix"].iter().enumerate() {
            let now = start + Duration::from_millis(120 * i as u64);
            tickets.extend(search.poll_debounce(now));
            search.set_query(*text, now);
        }
        tickets.extend(search.poll_debounce(start + Duration::from_millis(360) + WINDOW));

        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].term, "matrix");
    }

    #[test]
    fn test_results_preserve_order() {
        let keys = KeyListeners::new();
        let mut search = controller(&keys);
        let ticket = search.commit("coco").unwrap();

        let results = vec![movie("tt2", "Coco"), movie("tt1", "Coco Before Chanel")];
        assert!(search.apply(&ticket, Ok(results.clone())));
        assert_eq!(search.results(), results.as_slice());
        assert!(search.contains_result("tt1"));
        assert!(search.failure().is_none());
    }

    #[test]
    fn test_empty_query_is_idle_regardless_of_prior_state() {
        let keys = KeyListeners::new();
        let mut search = controller(&keys);

        let ticket = search.commit("coco").unwrap();
        search.apply(&ticket, Ok(vec![movie("tt2", "Coco")]));
        assert_eq!(search.commit(""), None);
        assert_eq!(search.state(), &SearchViewState::Idle);
        assert!(search.results().is_empty());

        let ticket = search.commit("zzz").unwrap();
        search.apply(&ticket, Err(SourceError::Transport("boom".to_string())));
        assert_eq!(search.commit(""), None);
        assert_eq!(search.state(), &SearchViewState::Idle);
        assert!(search.failure().is_none());

        search.commit("slow");
        assert_eq!(search.commit(""), None);
        assert_eq!(search.state(), &SearchViewState::Idle);
    }

    #[test]
    fn test_clearing_query_ignores_in_flight_response() {
        let keys = KeyListeners::new();
        let mut search = controller(&keys);

        let ticket = search.commit("coco").unwrap();
        search.commit("");
        assert!(!search.apply(&ticket, Ok(vec![movie("tt2", "Coco")])));
        assert_eq!(search.state(), &SearchViewState::Idle);
    }

    #[test]
    fn test_stale_response_arriving_late_is_ignored() {
        let keys = KeyListeners::new();
        let mut search = controller(&keys);

        let a = search.commit("alien").unwrap();
        let b = search.commit("blade runner").unwrap();

        assert!(search.apply(&b, Ok(vec![movie("tt0083658", "Blade Runner")])));
        let after_b = search.state().clone();

        assert!(!search.apply(&a, Ok(vec![movie("tt0078748", "Alien")])));
        assert_eq!(search.state(), &after_b);

        assert!(!search.apply(&a, Err(SourceError::Transport("timeout".to_string()))));
        assert_eq!(search.state(), &after_b);
    }

    #[test]
    fn test_stale_response_arriving_early_is_ignored() {
        let keys = KeyListeners::new();
        let mut search = controller(&keys);

        let a = search.commit("alien").unwrap();
        let _b = search.commit("blade runner").unwrap();

        assert!(!search.apply(&a, Ok(vec![movie("tt0078748", "Alien")])));
        assert!(search.is_loading());
    }

    #[test]
    fn test_not_found_and_transport_messages() {
        let keys = KeyListeners::new();
        let mut search = controller(&keys);

        let ticket = search.commit("zzzznomovie").unwrap();
        search.apply(&ticket, Err(SourceError::NotFound("Movie not found!".to_string())));
        assert_eq!(search.failure().map(|f| f.message()), Some("Movie Not Found"));

        let ticket = search.commit("coco").unwrap();
        search.apply(&ticket, Err(SourceError::Decode("expected value".to_string())));
        assert_eq!(
            search.failure().map(|f| f.to_string()),
            Some("Something went wrong with fetching movies.".to_string())
        );
        assert!(search.results().is_empty());
    }

    #[test]
    fn test_enter_focuses_and_clears_display_only() {
        let keys = KeyListeners::new();
        let mut search = controller(&keys);
        let start = Instant::now();

        let ticket = search.commit("coco").unwrap();
        search.apply(&ticket, Ok(vec![movie("tt2", "Coco")]));
        search.set_query("coco 2", start);

        search.on_enter();
        assert!(search.is_focused());
        assert_eq!(search.query(), "");
        assert_eq!(search.effective_term(), "coco");
        assert!(!search.has_pending_commit());
        assert_eq!(search.poll_debounce(start + WINDOW), None);
        assert!(search.contains_result("tt2"));
    }

    #[test]
    fn test_enter_while_focused_does_nothing() {
        let keys = KeyListeners::new();
        let mut search = controller(&keys);
        search.set_focused(true);
        search.set_query("alien", Instant::now());

        search.on_enter();
        assert_eq!(search.query(), "alien");
        assert!(search.has_pending_commit());
    }

    #[test]
    fn test_focus_listener_lives_with_controller() {
        let keys = KeyListeners::new();
        let search = controller(&keys);
        assert_eq!(keys.count(Listener::FocusSearch), 1);
        drop(search);
        assert_eq!(keys.count(Listener::FocusSearch), 0);
    }
}
