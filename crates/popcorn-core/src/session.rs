//! The application loop: one task, no shared-state threads.
//!
//! UI events, completions of in-flight requests and the debounce deadline are
//! multiplexed with `tokio::select!`. Requests run concurrently inside a
//! `FuturesUnordered`, but their results are applied one at a time and only
//! if their ticket is still the latest for its stream.

use crate::keys::{Key, KeyListeners, Listener};
use crate::search::{SearchController, SearchTicket};
use crate::selection::{DetailTicket, SelectionController, SelectionError};
use crate::storage::KeyValueStore;
use crate::watched::{StoreError, WatchedStore, WriteStatus};
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use popcorn_models::{MovieDetail, MovieSummary, UserRating, WatchedEntry, WatchedSummary};
use popcorn_sources::{MovieSearchClient, SourceError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tracing::{debug, error};

pub const APP_TITLE: &str = "usePopcorn";

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// New contents of the search input.
    Query(String),
    Key(Key),
    /// Search input gained or lost focus.
    Focus(bool),
    Select(String),
    Close,
    Rate(u8),
    Commit,
    Remove(String),
}

/// Messages for the presentation layer that are not part of any view state.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// The watched list changed in memory but could not be saved.
    StorageWarning(String),
    /// A user action was refused (e.g. rating outside 1-10).
    Rejected(String),
    Added(WatchedEntry),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("movie {0} is not in the current results or the watched list")]
    UnknownMovie(String),

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

enum Completion {
    Search(SearchTicket, Result<Vec<MovieSummary>, SourceError>),
    Detail(DetailTicket, Result<MovieDetail, SourceError>),
}

enum Wake {
    Event(Option<UiEvent>),
    Completed(Completion),
    DebounceDue,
}

pub struct Session<C, S> {
    client: Arc<C>,
    keys: KeyListeners,
    search: SearchController,
    selection: SelectionController,
    watched: WatchedStore<S>,
    in_flight: FuturesUnordered<BoxFuture<'static, Completion>>,
    notices: Vec<Notice>,
}

impl<C, S> Session<C, S>
where
    C: MovieSearchClient + 'static,
    S: KeyValueStore,
{
    pub fn new(client: Arc<C>, watched: WatchedStore<S>, debounce: Duration) -> Self {
        let keys = KeyListeners::new();
        Self {
            client,
            search: SearchController::new(debounce, &keys),
            selection: SelectionController::new(&keys),
            keys,
            watched,
            in_flight: FuturesUnordered::new(),
            notices: Vec::new(),
        }
    }

    pub fn search(&self) -> &SearchController {
        &self.search
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn watched(&self) -> &WatchedStore<S> {
        &self.watched
    }

    pub fn keys(&self) -> &KeyListeners {
        &self.keys
    }

    pub fn summary(&self) -> WatchedSummary {
        self.watched.summary()
    }

    /// Window title: the open movie's title while its details are shown.
    pub fn title(&self) -> String {
        match self.selection.open().and_then(|open| open.loaded_detail()) {
            Some(detail) => format!("Movie | {}", detail.title),
            None => APP_TITLE.to_string(),
        }
    }

    /// Stored rating when the open movie is already watched.
    pub fn watched_rating(&self) -> Option<UserRating> {
        self.selection.watched_rating(&self.watched)
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether a debounce is pending or a request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.search.has_pending_commit() || !self.in_flight.is_empty()
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.search.set_query(text, Instant::now());
    }

    /// Search for `term` immediately, skipping the debounce window.
    pub fn search_now(&mut self, term: impl Into<String>) {
        if let Some(ticket) = self.search.commit(term) {
            self.spawn_search(ticket);
        }
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.search.set_focused(focused);
    }

    pub fn press_key(&mut self, key: Key) {
        for listener in self.keys.dispatch(&key) {
            match listener {
                Listener::FocusSearch => self.search.on_enter(),
                Listener::CloseDetail => self.selection.close(),
            }
        }
    }

    /// Open a movie from the current results or the watched list.
    pub fn select(&mut self, id: &str) -> Result<(), SessionError> {
        if !self.search.contains_result(id) && !self.watched.contains(id) {
            return Err(SessionError::UnknownMovie(id.to_string()));
        }
        let ticket = self.selection.select(id);
        self.spawn_detail(ticket);
        Ok(())
    }

    pub fn close(&mut self) {
        self.selection.close();
    }

    pub fn rate(&mut self, value: u8) -> Result<UserRating, SessionError> {
        Ok(self.selection.set_rating(value, &self.watched)?)
    }

    /// Add the open movie to the watched list and return to the list view.
    pub fn commit(&mut self) -> Result<WatchedEntry, SessionError> {
        match self.selection.commit(&mut self.watched) {
            Ok(committed) => {
                self.note_write(&committed.write);
                self.notices.push(Notice::Added(committed.entry.clone()));
                Ok(committed.entry)
            }
            Err(SelectionError::Store(StoreError::DuplicateEntry(id))) => {
                // The controller checks membership first, so this is a logic bug
                error!("Duplicate watched entry {} reached the store", id);
                debug_assert!(false, "duplicate watched entry {}", id);
                Err(SelectionError::Store(StoreError::DuplicateEntry(id)).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn remove(&mut self, id: &str) -> WriteStatus {
        let status = self.watched.remove(id);
        self.note_write(&status);

        // The detail view may only show movies reachable from one of the lists
        if self.selection.selected_id() == Some(id) && !self.search.contains_result(id) {
            self.selection.close();
        }
        status
    }

    pub fn handle(&mut self, event: UiEvent) -> Result<(), SessionError> {
        match event {
            UiEvent::Query(text) => self.set_query(text),
            UiEvent::Key(key) => self.press_key(key),
            UiEvent::Focus(focused) => self.set_focus(focused),
            UiEvent::Select(id) => self.select(&id)?,
            UiEvent::Close => self.close(),
            UiEvent::Rate(value) => {
                self.rate(value)?;
            }
            UiEvent::Commit => {
                self.commit()?;
            }
            UiEvent::Remove(id) => {
                self.remove(&id);
            }
        }
        Ok(())
    }

    /// Process events until the channel closes, calling `render` with the
    /// notices raised since the last call after every change. Stale
    /// responses cause no render.
    pub async fn run<F>(&mut self, mut events: mpsc::Receiver<UiEvent>, mut render: F)
    where
        F: FnMut(&Self, Vec<Notice>),
    {
        let notices = self.take_notices();
        render(&*self, notices);
        loop {
            match self.next_wake(&mut events).await {
                Wake::Event(Some(event)) => {
                    if let Err(e) = self.handle(event) {
                        debug!("Action rejected: {}", e);
                        self.notices.push(Notice::Rejected(e.to_string()));
                    }
                }
                Wake::Event(None) => break,
                Wake::Completed(done) => {
                    if !self.apply_completion(done) {
                        continue;
                    }
                }
                Wake::DebounceDue => self.fire_debounce(),
            }
            let notices = self.take_notices();
            render(&*self, notices);
        }
    }

    /// Drive pending debounce and requests until nothing is outstanding.
    pub async fn settle(&mut self) {
        let (_idle_tx, mut idle) = mpsc::channel::<UiEvent>(1);
        while self.is_busy() {
            match self.next_wake(&mut idle).await {
                Wake::Completed(done) => {
                    self.apply_completion(done);
                }
                Wake::DebounceDue => self.fire_debounce(),
                Wake::Event(_) => {}
            }
        }
    }

    async fn next_wake(&mut self, events: &mut mpsc::Receiver<UiEvent>) -> Wake {
        let deadline = self.search.debounce_deadline();
        let debounce = time::sleep_until(deadline.unwrap_or_else(Instant::now));
        let in_flight = &mut self.in_flight;

        tokio::select! {
            event = events.recv() => Wake::Event(event),
            Some(done) = in_flight.next(), if !in_flight.is_empty() => Wake::Completed(done),
            _ = debounce, if deadline.is_some() => Wake::DebounceDue,
        }
    }

    fn fire_debounce(&mut self) {
        if let Some(ticket) = self.search.poll_debounce(Instant::now()) {
            self.spawn_search(ticket);
        }
    }

    fn apply_completion(&mut self, done: Completion) -> bool {
        match done {
            Completion::Search(ticket, outcome) => self.search.apply(&ticket, outcome),
            Completion::Detail(ticket, outcome) => self.selection.apply(&ticket, outcome),
        }
    }

    fn spawn_search(&mut self, ticket: SearchTicket) {
        let client = Arc::clone(&self.client);
        self.in_flight.push(Box::pin(async move {
            let outcome = client.search(&ticket.term).await;
            Completion::Search(ticket, outcome)
        }));
    }

    fn spawn_detail(&mut self, ticket: DetailTicket) {
        let client = Arc::clone(&self.client);
        self.in_flight.push(Box::pin(async move {
            let outcome = client.get_details(&ticket.id).await;
            Completion::Detail(ticket, outcome)
        }));
    }

    fn note_write(&mut self, status: &WriteStatus) {
        if let WriteStatus::Unpersisted(reason) = status {
            self.notices.push(Notice::StorageWarning(format!(
                "Your watched list could not be saved ({}); changes are kept for this session only.",
                reason
            )));
        }
    }
}
