use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use crate::credentials::CredentialStore;

pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";

/// Environment variable that takes precedence over every stored API key
pub const API_KEY_ENV: &str = "POPCORN_OMDB_API_KEY";

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Lowest-precedence key; prefer credentials.toml or the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_watched_key")]
    pub watched_key: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_watched_key() -> String {
    "watched".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            watched_key: default_watched_key(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Missing file means defaults; a present but broken file is still an error.
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("api.base_url cannot be empty"));
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!("api.base_url must be an http(s) URL: {}", self.api.base_url));
        }
        if self.search.debounce_ms == 0 {
            return Err(anyhow::anyhow!("search.debounce_ms must be greater than zero"));
        }
        if self.storage.watched_key.trim().is_empty() {
            return Err(anyhow::anyhow!("storage.watched_key cannot be empty"));
        }
        Ok(())
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    /// Resolve the OMDb key: environment, then credentials file, then config.
    pub fn resolve_api_key(&self, credentials: &CredentialStore) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| credentials.get_omdb_api_key().cloned())
            .or_else(|| self.api.api_key.clone().filter(|k| !k.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            api: ApiConfig {
                base_url: "https://omdb.example.test/".to_string(),
                api_key: Some("from-config".to_string()),
            },
            search: SearchConfig { debounce_ms: 250 },
            storage: StorageConfig::default(),
        };

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.api.base_url, "https://omdb.example.test/");
        assert_eq!(loaded.api.api_key.as_deref(), Some("from-config"));
        assert_eq!(loaded.search.debounce_ms, 250);
        assert_eq!(loaded.storage.watched_key, "watched");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[search]\ndebounce_ms = 800\n").unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.search.debounce_ms, 800);
        assert_eq!(config.debounce_window(), Duration::from_millis(800));
        assert_eq!(config.storage.watched_key, "watched");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.search.debounce_ms, 500);
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.search.debounce_ms = 0;
        assert!(config.validate().is_err());

        config.search.debounce_ms = 500;
        config.api.base_url = "ftp://nope".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = DEFAULT_BASE_URL.to_string();
        config.storage.watched_key = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_key_precedence_without_env() {
        // Only meaningful when the override variable is not set in the test environment
        if std::env::var(API_KEY_ENV).is_ok() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let mut credentials = CredentialStore::new(dir.path().join("credentials.toml"));

        let mut config = Config::default();
        assert_eq!(config.resolve_api_key(&credentials), None);

        config.api.api_key = Some("from-config".to_string());
        assert_eq!(config.resolve_api_key(&credentials).as_deref(), Some("from-config"));

        credentials.set_omdb_api_key("from-credentials".to_string());
        assert_eq!(config.resolve_api_key(&credentials).as_deref(), Some("from-credentials"));
    }
}
