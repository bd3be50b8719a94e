use thiserror::Error;

/// Failure of a single request to the movie database.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// Network failure or non-success HTTP status.
    #[error("request failed: {0}")]
    Transport(String),

    /// The body was not the JSON shape the provider documents.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// Well-formed answer saying there is nothing to return.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Transport(err.to_string())
    }
}
