use serde::{Deserialize, Serialize};
use crate::error::ModelError;
use crate::movie::MovieDetail;
use crate::rating::UserRating;

/// A movie the user has watched and rated. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchedEntry {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster_url: String,
    pub runtime_minutes: u32,
    pub imdb_rating: Option<f64>,
    pub user_rating: UserRating,
}

impl WatchedEntry {
    /// Build an entry from a loaded detail record and the user's rating.
    ///
    /// Fails when the detail's runtime text has no leading minute count.
    pub fn from_detail(detail: &MovieDetail, user_rating: UserRating) -> Result<Self, ModelError> {
        Ok(Self {
            id: detail.id.clone(),
            title: detail.title.clone(),
            year: detail.year.clone(),
            poster_url: detail.poster_url.clone(),
            runtime_minutes: detail.runtime_minutes()?,
            imdb_rating: detail.imdb_rating,
            user_rating,
        })
    }
}
