use crate::keys::{KeyListeners, Listener, Subscription};
use crate::storage::KeyValueStore;
use crate::watched::{StoreError, WatchedStore, WriteStatus};
use popcorn_models::{ModelError, MovieDetail, UserRating, WatchedEntry};
use popcorn_sources::SourceError;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailFailure {
    Transport,
    NotFound(String),
}

impl fmt::Display for DetailFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailFailure::Transport => f.write_str("Something went wrong with fetching movie details."),
            DetailFailure::NotFound(message) => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    Loaded(MovieDetail),
    /// Terminal for this open session; not retried.
    Failed(DetailFailure),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenMovie {
    pub id: String,
    pub detail: DetailState,
    pub pending_rating: Option<UserRating>,
}

impl OpenMovie {
    pub fn loaded_detail(&self) -> Option<&MovieDetail> {
        match &self.detail {
            DetailState::Loaded(detail) => Some(detail),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionState {
    None,
    Open(OpenMovie),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTicket {
    pub generation: u64,
    pub id: String,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SelectionError {
    #[error("no movie is open")]
    NotOpen,

    #[error("movie details have not loaded")]
    DetailNotLoaded,

    #[error("rating {0} is outside 1-10")]
    InvalidRating(u8),

    #[error("you already rated this movie {0}")]
    AlreadyWatched(UserRating),

    #[error("set a rating before adding the movie")]
    NoRating,

    #[error(transparent)]
    Runtime(#[from] ModelError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, PartialEq)]
pub struct Committed {
    pub entry: WatchedEntry,
    pub write: WriteStatus,
}

/// Which movie, if any, is open in the detail view.
pub struct SelectionController {
    state: SelectionState,
    generation: u64,
    keys: KeyListeners,
    escape_listener: Option<Subscription>,
}

impl SelectionController {
    pub fn new(keys: &KeyListeners) -> Self {
        Self {
            state: SelectionState::None,
            generation: 0,
            keys: keys.clone(),
            escape_listener: None,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn open(&self) -> Option<&OpenMovie> {
        match &self.state {
            SelectionState::Open(open) => Some(open),
            SelectionState::None => None,
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.open().map(|open| open.id.as_str())
    }

    pub fn is_open(&self) -> bool {
        self.open().is_some()
    }

    /// Open `id`, superseding whatever was open or loading before.
    pub fn select(&mut self, id: impl Into<String>) -> DetailTicket {
        let id = id.into();
        self.generation += 1;
        debug!(generation = self.generation, id = %id, "Opening movie");

        self.state = SelectionState::Open(OpenMovie {
            id: id.clone(),
            detail: DetailState::Loading,
            pending_rating: None,
        });
        if self.escape_listener.is_none() {
            self.escape_listener = Some(self.keys.subscribe(Listener::CloseDetail));
        }

        DetailTicket {
            generation: self.generation,
            id,
        }
    }

    pub fn close(&mut self) {
        if self.is_open() {
            debug!("Closing movie {:?}", self.selected_id());
        }
        self.state = SelectionState::None;
        self.escape_listener = None;
        // Responses still in flight for the closed movie must not reopen it
        self.generation += 1;
    }

    /// Apply a detail response. Returns `false` when it was stale and ignored.
    pub fn apply(&mut self, ticket: &DetailTicket, outcome: Result<MovieDetail, SourceError>) -> bool {
        let open = match &mut self.state {
            SelectionState::Open(open) if ticket.generation == self.generation => open,
            _ => {
                debug!(id = %ticket.id, "Ignoring stale detail response");
                return false;
            }
        };

        open.detail = match outcome {
            Ok(detail) => DetailState::Loaded(detail),
            Err(SourceError::NotFound(message)) => {
                info!(id = %ticket.id, "Movie details not found: {}", message);
                DetailState::Failed(DetailFailure::NotFound(message))
            }
            Err(e) => {
                warn!(id = %ticket.id, "Failed to fetch movie details: {}", e);
                DetailState::Failed(DetailFailure::Transport)
            }
        };
        true
    }

    /// The stored rating when the open movie is already in the watched list.
    pub fn watched_rating<S: KeyValueStore>(&self, watched: &WatchedStore<S>) -> Option<UserRating> {
        let id = self.selected_id()?;
        watched.get(id).map(|entry| entry.user_rating)
    }

    pub fn set_rating<S: KeyValueStore>(
        &mut self,
        value: u8,
        watched: &WatchedStore<S>,
    ) -> Result<UserRating, SelectionError> {
        if let Some(existing) = self.watched_rating(watched) {
            return Err(SelectionError::AlreadyWatched(existing));
        }
        let open = match &mut self.state {
            SelectionState::Open(open) => open,
            SelectionState::None => return Err(SelectionError::NotOpen),
        };
        if open.loaded_detail().is_none() {
            return Err(SelectionError::DetailNotLoaded);
        }

        let rating = UserRating::new(value).map_err(|_| SelectionError::InvalidRating(value))?;
        open.pending_rating = Some(rating);
        Ok(rating)
    }

    /// Add the open movie with its pending rating to `watched`, then close.
    ///
    /// On any error the view stays open with its rating intact.
    pub fn commit<S: KeyValueStore>(&mut self, watched: &mut WatchedStore<S>) -> Result<Committed, SelectionError> {
        if let Some(existing) = self.watched_rating(watched) {
            return Err(SelectionError::AlreadyWatched(existing));
        }
        let open = self.open().ok_or(SelectionError::NotOpen)?;
        let detail = open.loaded_detail().ok_or(SelectionError::DetailNotLoaded)?;
        let rating = open.pending_rating.ok_or(SelectionError::NoRating)?;

        let entry = WatchedEntry::from_detail(detail, rating)?;
        let write = watched.add(entry.clone())?;

        info!("Added {} ({}) rated {}", entry.title, entry.id, rating);
        self.close();
        Ok(Committed { entry, write })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn detail(id: &str, title: &str, runtime: &str, imdb: Option<f64>) -> MovieDetail {
        MovieDetail {
            id: id.to_string(),
            title: title.to_string(),
            year: "2010".to_string(),
            poster_url: "https://img.test/poster.jpg".to_string(),
            runtime: runtime.to_string(),
            imdb_rating: imdb,
            plot: String::new(),
            released: String::new(),
            actors: String::new(),
            director: String::new(),
            genre: String::new(),
        }
    }

    fn store() -> WatchedStore<MemoryStore> {
        WatchedStore::load(MemoryStore::new(), "watched")
    }

    fn open_loaded(selection: &mut SelectionController, d: MovieDetail) {
        let ticket = selection.select(d.id.clone());
        assert!(selection.apply(&ticket, Ok(d)));
    }

    #[test]
    fn test_select_moves_to_loading() {
        let keys = KeyListeners::new();
        let mut selection = SelectionController::new(&keys);
        let ticket = selection.select("tt1375666");

        assert_eq!(ticket.id, "tt1375666");
        let open = selection.open().unwrap();
        assert_eq!(open.detail, DetailState::Loading);
        assert_eq!(open.pending_rating, None);
    }

    #[test]
    fn test_commit_inception() {
        let keys = KeyListeners::new();
        let mut selection = SelectionController::new(&keys);
        let mut watched = store();
        open_loaded(&mut selection, detail("tt1375666", "Inception", "148 min", Some(8.8)));

        selection.set_rating(10, &watched).unwrap();
        let committed = selection.commit(&mut watched).unwrap();

        assert_eq!(committed.entry.title, "Inception");
        assert_eq!(committed.entry.runtime_minutes, 148);
        assert_eq!(committed.entry.imdb_rating, Some(8.8));
        assert_eq!(committed.entry.user_rating.get(), 10);
        assert_eq!(committed.write, WriteStatus::Persisted);
        assert_eq!(selection.state(), &SelectionState::None);
        assert!(watched.contains("tt1375666"));
    }

    #[test]
    fn test_unparsable_runtime_fails_commit_and_stays_open() {
        let keys = KeyListeners::new();
        let mut selection = SelectionController::new(&keys);
        let mut watched = store();
        open_loaded(&mut selection, detail("tt9", "Mystery", "N/A", None));

        selection.set_rating(7, &watched).unwrap();
        let err = selection.commit(&mut watched).unwrap_err();

        assert_eq!(err, SelectionError::Runtime(ModelError::InvalidRuntime("N/A".to_string())));
        assert!(watched.is_empty());
        let open = selection.open().unwrap();
        assert_eq!(open.pending_rating.map(UserRating::get), Some(7));
    }

    #[test]
    fn test_rating_bounds() {
        let keys = KeyListeners::new();
        let mut selection = SelectionController::new(&keys);
        let watched = store();
        open_loaded(&mut selection, detail("tt1", "One", "90 min", None));

        assert_eq!(selection.set_rating(0, &watched), Err(SelectionError::InvalidRating(0)));
        assert_eq!(selection.set_rating(11, &watched), Err(SelectionError::InvalidRating(11)));
        assert_eq!(selection.open().unwrap().pending_rating, None);
        assert_eq!(selection.set_rating(1, &watched).map(UserRating::get), Ok(1));
    }

    #[test]
    fn test_rating_requires_loaded_detail() {
        let keys = KeyListeners::new();
        let mut selection = SelectionController::new(&keys);
        let watched = store();

        assert_eq!(selection.set_rating(5, &watched), Err(SelectionError::NotOpen));
        selection.select("tt1");
        assert_eq!(selection.set_rating(5, &watched), Err(SelectionError::DetailNotLoaded));
    }

    #[test]
    fn test_commit_requires_rating() {
        let keys = KeyListeners::new();
        let mut selection = SelectionController::new(&keys);
        let mut watched = store();
        open_loaded(&mut selection, detail("tt1", "One", "90 min", None));

        assert_eq!(selection.commit(&mut watched), Err(SelectionError::NoRating));
        assert!(selection.is_open());
    }

    #[test]
    fn test_already_watched_exposes_read_only_rating() {
        let keys = KeyListeners::new();
        let mut selection = SelectionController::new(&keys);
        let mut watched = store();
        open_loaded(&mut selection, detail("tt1", "One", "90 min", Some(6.0)));
        selection.set_rating(6, &watched).unwrap();
        selection.commit(&mut watched).unwrap();

        open_loaded(&mut selection, detail("tt1", "One", "90 min", Some(6.0)));
        let stored = UserRating::new(6).unwrap();
        assert_eq!(selection.watched_rating(&watched), Some(stored));
        assert_eq!(selection.set_rating(9, &watched), Err(SelectionError::AlreadyWatched(stored)));
        assert_eq!(selection.commit(&mut watched), Err(SelectionError::AlreadyWatched(stored)));
        assert_eq!(watched.len(), 1);
    }

    #[test]
    fn test_slow_detail_for_previous_selection_is_ignored() {
        let keys = KeyListeners::new();
        let mut selection = SelectionController::new(&keys);

        let first = selection.select("tt0078748");
        let second = selection.select("tt0083658");

        assert!(selection.apply(&second, Ok(detail("tt0083658", "Blade Runner", "117 min", Some(8.1)))));
        assert!(!selection.apply(&first, Ok(detail("tt0078748", "Alien", "117 min", Some(8.5)))));

        let open = selection.open().unwrap();
        assert_eq!(open.id, "tt0083658");
        assert_eq!(open.loaded_detail().unwrap().title, "Blade Runner");
    }

    #[test]
    fn test_response_after_close_is_ignored() {
        let keys = KeyListeners::new();
        let mut selection = SelectionController::new(&keys);
        let ticket = selection.select("tt1");
        selection.close();

        assert!(!selection.apply(&ticket, Ok(detail("tt1", "One", "90 min", None))));
        assert_eq!(selection.state(), &SelectionState::None);
    }

    #[test]
    fn test_detail_failure_is_terminal() {
        let keys = KeyListeners::new();
        let mut selection = SelectionController::new(&keys);
        let ticket = selection.select("bogus");

        selection.apply(&ticket, Err(SourceError::NotFound("Incorrect IMDb ID.".to_string())));
        assert_eq!(
            selection.open().unwrap().detail,
            DetailState::Failed(DetailFailure::NotFound("Incorrect IMDb ID.".to_string()))
        );

        let ticket = selection.select("tt1");
        selection.apply(&ticket, Err(SourceError::Transport("reset".to_string())));
        let failure = match &selection.open().unwrap().detail {
            DetailState::Failed(failure) => failure.to_string(),
            other => panic!("unexpected detail state {:?}", other),
        };
        assert_eq!(failure, "Something went wrong with fetching movie details.");
    }

    #[test]
    fn test_escape_listener_only_while_open() {
        let keys = KeyListeners::new();
        let mut selection = SelectionController::new(&keys);
        assert_eq!(keys.count(Listener::CloseDetail), 0);

        for id in ["tt1", "tt2", "tt3"] {
            selection.select(id);
            assert_eq!(keys.count(Listener::CloseDetail), 1);
        }
        selection.close();
        assert_eq!(keys.count(Listener::CloseDetail), 0);

        selection.select("tt4");
        selection.close();
        selection.select("tt5");
        assert_eq!(keys.count(Listener::CloseDetail), 1);
    }
}
