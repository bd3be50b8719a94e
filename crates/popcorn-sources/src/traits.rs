use async_trait::async_trait;
use popcorn_models::{MovieDetail, MovieSummary};
use crate::error::SourceError;

/// Remote movie database: one request per call, no retries, no caching.
#[async_trait]
pub trait MovieSearchClient: Send + Sync {
    /// Search by free-text title. Results keep the provider's ordering.
    async fn search(&self, term: &str) -> Result<Vec<MovieSummary>, SourceError>;

    /// Full record for a single movie id.
    async fn get_details(&self, id: &str) -> Result<MovieDetail, SourceError>;
}
