pub mod debounce;
pub mod keys;
pub mod search;
pub mod selection;
pub mod session;
pub mod storage;
pub mod watched;

pub use debounce::Debouncer;
pub use keys::{Key, KeyListeners, Listener, Subscription};
pub use search::{SearchController, SearchFailure, SearchTicket, SearchViewState};
pub use selection::{Committed, DetailFailure, DetailState, DetailTicket, OpenMovie, SelectionController, SelectionError, SelectionState};
pub use session::{Notice, Session, SessionError, UiEvent, APP_TITLE};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use watched::{StoreError, WatchedStore, WriteStatus};
