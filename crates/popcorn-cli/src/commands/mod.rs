pub mod browse;
pub mod clear;
pub mod config;
pub mod details;
pub mod prompts;
pub mod search;
pub mod watched;

use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use popcorn_config::{Config, CredentialStore, PathManager};
use popcorn_core::{JsonFileStore, WatchedStore};
use popcorn_sources::OmdbClient;
use std::io::IsTerminal;
use std::time::Duration;

/// Paths, validated config and credentials shared by every command.
pub struct AppContext {
    pub paths: PathManager,
    pub config: Config,
    pub credentials: CredentialStore,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        Self::load_from(PathManager::default())
    }

    pub fn load_from(paths: PathManager) -> Result<Self> {
        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config
            .validate()
            .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;

        let credentials_file = paths.credentials_file();
        let mut credentials = CredentialStore::new(credentials_file.clone());
        credentials
            .load()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

        tracing::debug!("Loaded configuration from {}", config_file.display());
        Ok(Self { paths, config, credentials })
    }

    pub fn client(&self) -> Result<OmdbClient> {
        OmdbClient::from_config(&self.config, &self.credentials).map_err(|e| color_eyre::eyre::eyre!("{}", e))
    }

    pub fn storage(&self) -> JsonFileStore {
        JsonFileStore::new(self.paths.storage_dir())
    }

    pub fn watched_store(&self) -> WatchedStore<JsonFileStore> {
        WatchedStore::load(self.storage(), self.config.storage.watched_key.as_str())
    }
}

/// Spinner on stderr for human output on a terminal; hidden otherwise.
pub fn spinner(output: &Output, msg: &str) -> ProgressBar {
    if output.is_quiet() || output.format() != OutputFormat::Human || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .map(|s| s.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"))
    {
        spinner.set_style(style);
    }
    spinner.set_message(msg.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use popcorn_core::KeyValueStore;

    #[test]
    fn test_context_defaults_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::load_from(PathManager::from_base(dir.path().to_path_buf())).unwrap();

        assert_eq!(ctx.config.search.debounce_ms, 500);
        assert!(ctx.watched_store().is_empty());
    }

    #[test]
    fn test_watched_store_uses_configured_key() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::from_base(dir.path().to_path_buf());
        std::fs::write(paths.config_file(), "[storage]\nwatched_key = \"seen\"\n").unwrap();

        let ctx = AppContext::load_from(paths).unwrap();
        ctx.storage().set("seen", "[]").unwrap();
        assert!(ctx.storage().path_for("seen").exists());
        assert!(ctx.watched_store().is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::from_base(dir.path().to_path_buf());
        std::fs::write(paths.config_file(), "[search]\ndebounce_ms = 0\n").unwrap();

        assert!(AppContext::load_from(paths).is_err());
    }
}
