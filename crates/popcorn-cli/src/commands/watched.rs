use super::AppContext;
use crate::output::Output;
use crate::WatchedCommands;
use color_eyre::Result;
use popcorn_core::{KeyValueStore, WatchedStore, WriteStatus};

pub fn run_watched(cmd: WatchedCommands, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut store = ctx.watched_store();

    match cmd {
        WatchedCommands::List => {
            output.watched(store.entries(), &store.summary());
            Ok(())
        }
        WatchedCommands::Summary => {
            output.summary(&store.summary());
            Ok(())
        }
        WatchedCommands::Remove { id } => remove_entry(&mut store, &id, output),
    }
}

fn remove_entry<S: KeyValueStore>(store: &mut WatchedStore<S>, id: &str, output: &Output) -> Result<()> {
    let title = store.get(id).map(|e| e.title.clone());
    match store.remove(id) {
        WriteStatus::Persisted => {
            output.success(format!("Removed {} from your watched list", title.as_deref().unwrap_or(id)));
            Ok(())
        }
        WriteStatus::Unchanged => {
            output.warn(format!("{} is not in your watched list", id));
            Ok(())
        }
        WriteStatus::Unpersisted(reason) => Err(color_eyre::eyre::eyre!(
            "Removed {} but the watched list could not be saved: {}",
            id,
            reason
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use popcorn_core::MemoryStore;
    use popcorn_models::{UserRating, WatchedEntry};

    fn store_with_inception(storage: &MemoryStore) -> WatchedStore<MemoryStore> {
        let mut store = WatchedStore::load(storage.clone(), "watched");
        store
            .add(WatchedEntry {
                id: "tt1375666".to_string(),
                title: "Inception".to_string(),
                year: "2010".to_string(),
                poster_url: String::new(),
                runtime_minutes: 148,
                imdb_rating: Some(8.8),
                user_rating: UserRating::new(10).unwrap(),
            })
            .unwrap();
        store
    }

    #[test]
    fn test_remove_entry_persists() {
        let storage = MemoryStore::new();
        let mut store = store_with_inception(&storage);
        let output = Output::new(OutputFormat::Json, true);

        remove_entry(&mut store, "tt1375666", &output).unwrap();
        assert!(store.is_empty());
        assert_eq!(storage.raw("watched").as_deref(), Some("[]"));
    }

    #[test]
    fn test_remove_absent_entry_is_not_an_error() {
        let storage = MemoryStore::new();
        let mut store = store_with_inception(&storage);
        let output = Output::new(OutputFormat::Json, true);

        remove_entry(&mut store, "tt0000000", &output).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_with_failing_storage_reports_error() {
        let storage = MemoryStore::new();
        let mut store = store_with_inception(&storage);
        storage.set_fail_writes(true);
        let output = Output::new(OutputFormat::Json, true);

        assert!(remove_entry(&mut store, "tt1375666", &output).is_err());
        assert!(store.is_empty());
    }
}
