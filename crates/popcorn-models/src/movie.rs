use serde::{Deserialize, Serialize};
use crate::error::ModelError;

/// One row of a search result list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieSummary {
    pub id: String, // IMDb id, e.g. "tt1375666"
    pub title: String,
    pub year: String, // Free text: "2010", "2008–2013"
    pub poster_url: String,
}

/// Full record for the detail view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetail {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster_url: String,
    /// Provider text, normally "148 min"; see [`MovieDetail::runtime_minutes`].
    pub runtime: String,
    /// `None` when the provider reports "N/A".
    pub imdb_rating: Option<f64>,
    pub plot: String,
    pub released: String,
    pub actors: String,
    pub director: String,
    pub genre: String,
}

impl MovieDetail {
    pub fn runtime_minutes(&self) -> Result<u32, ModelError> {
        parse_runtime_minutes(&self.runtime)
    }
}

/// Parse the leading integer out of a free-text runtime such as "148 min".
///
/// Anything that does not start with digits ("N/A", "", "min 90") is an error,
/// never zero.
pub fn parse_runtime_minutes(text: &str) -> Result<u32, ModelError> {
    let trimmed = text.trim_start();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());

    trimmed[..digits_end]
        .parse::<u32>()
        .map_err(|_| ModelError::InvalidRuntime(text.to_string()))
}
