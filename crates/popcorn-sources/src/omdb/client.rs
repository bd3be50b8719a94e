use crate::error::SourceError;
use crate::omdb::api;
use crate::traits::MovieSearchClient;
use anyhow::Result;
use async_trait::async_trait;
use popcorn_config::{Config, CredentialStore, API_KEY_ENV};
use popcorn_models::{MovieDetail, MovieSummary};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

fn create_omdb_client() -> Client {
    Client::builder()
        .user_agent(concat!("popcorn/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[derive(Clone)]
pub struct OmdbClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Arc::new(create_omdb_client()),
            base_url,
            api_key,
        }
    }

    /// Build a client from configuration, resolving the API key from the
    /// environment, the credentials file, then the config file.
    pub fn from_config(config: &Config, credentials: &CredentialStore) -> Result<Self> {
        let api_key = config.resolve_api_key(credentials).ok_or_else(|| {
            anyhow::anyhow!(
                "No OMDb API key configured. Run `popcorn config api-key` or set {}",
                API_KEY_ENV
            )
        })?;

        info!("Using OMDb endpoint {}", config.api.base_url);
        Ok(Self::new(config.api.base_url.clone(), api_key))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MovieSearchClient for OmdbClient {
    async fn search(&self, term: &str) -> Result<Vec<MovieSummary>, SourceError> {
        api::search(&self.client, &self.base_url, &self.api_key, term).await
    }

    async fn get_details(&self, id: &str) -> Result<MovieDetail, SourceError> {
        api::get_detail(&self.client, &self.base_url, &self.api_key, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_key() {
        if std::env::var(API_KEY_ENV).is_ok() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let credentials = CredentialStore::new(dir.path().join("credentials.toml"));
        let config = Config::default();
        assert!(OmdbClient::from_config(&config, &credentials).is_err());
    }

    #[test]
    fn test_from_config_uses_credentials() {
        if std::env::var(API_KEY_ENV).is_ok() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let mut credentials = CredentialStore::new(dir.path().join("credentials.toml"));
        credentials.set_omdb_api_key("abc".to_string());

        let client = OmdbClient::from_config(&Config::default(), &credentials).unwrap();
        assert_eq!(client.base_url(), popcorn_config::DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client = OmdbClient::new("http://127.0.0.1:9/".to_string(), "k".to_string());
        let result = client.search("coco").await;
        assert!(matches!(result, Err(SourceError::Transport(_))));
    }
}
