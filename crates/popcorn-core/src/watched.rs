use crate::storage::KeyValueStore;
use popcorn_models::{WatchedEntry, WatchedSummary};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("movie {0} is already in the watched list")]
    DuplicateEntry(String),
}

/// Result of a mutation with respect to durable storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteStatus {
    /// The full list was written before returning.
    Persisted,
    /// Nothing changed, nothing written.
    Unchanged,
    /// Memory changed but the write failed; memory stays authoritative.
    Unpersisted(String),
}

/// In-memory watched list with write-through persistence of the whole list.
pub struct WatchedStore<S> {
    storage: S,
    key: String,
    entries: Vec<WatchedEntry>,
}

impl<S: KeyValueStore> WatchedStore<S> {
    /// Load once from storage. Missing or unparsable data yields an empty list.
    pub fn load(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let entries = match storage.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<WatchedEntry>>(&raw) {
                Ok(entries) => {
                    info!("Loaded watched list: {} entries", entries.len());
                    dedupe_loaded(entries)
                }
                Err(e) => {
                    warn!("Stored watched list is corrupt ({}); starting with an empty list", e);
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!("No stored watched list under {:?}", key);
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to read watched list ({}); starting with an empty list", e);
                Vec::new()
            }
        };

        Self { storage, key, entries }
    }

    pub fn entries(&self) -> &[WatchedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&WatchedEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn summary(&self) -> WatchedSummary {
        WatchedSummary::from_entries(&self.entries)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Append `entry`. A duplicate id is rejected and leaves the list untouched.
    pub fn add(&mut self, entry: WatchedEntry) -> Result<WriteStatus, StoreError> {
        if self.contains(&entry.id) {
            return Err(StoreError::DuplicateEntry(entry.id));
        }
        debug!("Adding {} ({}) to watched list", entry.id, entry.title);
        self.entries.push(entry);
        Ok(self.persist())
    }

    /// Remove the entry with `id`; absent ids are a no-op.
    pub fn remove(&mut self, id: &str) -> WriteStatus {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            return WriteStatus::Unchanged;
        }
        debug!("Removed {} from watched list", id);
        self.persist()
    }

    fn persist(&self) -> WriteStatus {
        let json = match serde_json::to_string(&self.entries) {
            Ok(json) => json,
            Err(e) => return WriteStatus::Unpersisted(e.to_string()),
        };
        match self.storage.set(&self.key, &json) {
            Ok(()) => WriteStatus::Persisted,
            Err(e) => {
                warn!("Failed to persist watched list: {}", e);
                WriteStatus::Unpersisted(e.to_string())
            }
        }
    }
}

/// Hand-edited storage may repeat an id; keep the first occurrence.
fn dedupe_loaded(entries: Vec<WatchedEntry>) -> Vec<WatchedEntry> {
    let mut seen = std::collections::HashSet::new();
    let total = entries.len();
    let unique: Vec<WatchedEntry> = entries
        .into_iter()
        .filter(|e| seen.insert(e.id.clone()))
        .collect();
    if unique.len() != total {
        warn!("Dropped {} duplicate watched entries from storage", total - unique.len());
    }
    unique
}
