use crate::error::SourceError;
use popcorn_models::{MovieDetail, MovieSummary};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchItem>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: String,
}

// Every field defaults because a "False" response only carries Response + Error
#[derive(Debug, Deserialize)]
struct OmdbDetailResponse {
    #[serde(rename = "Response", default)]
    response: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "imdbID", default)]
    imdb_id: String,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: String,
    #[serde(rename = "Runtime", default)]
    runtime: String,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: String,
    #[serde(rename = "Plot", default)]
    plot: String,
    #[serde(rename = "Released", default)]
    released: String,
    #[serde(rename = "Actors", default)]
    actors: String,
    #[serde(rename = "Director", default)]
    director: String,
    #[serde(rename = "Genre", default)]
    genre: String,
}

/// Build a request URL with url-encoded query parameters.
fn endpoint(base_url: &str, params: &[(&str, &str)]) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}{}{}", base_url, separator, query)
}

pub fn search_url(base_url: &str, api_key: &str, term: &str) -> String {
    endpoint(base_url, &[("s", term), ("apikey", api_key)])
}

pub fn detail_url(base_url: &str, api_key: &str, id: &str) -> String {
    endpoint(base_url, &[("i", id), ("apikey", api_key)])
}

/// "8.8" -> Some(8.8); "N/A" or anything outside 0-10 -> None
fn parse_imdb_rating(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite() && (0.0..=10.0).contains(r))
}

fn is_true(response: &str) -> bool {
    response.eq_ignore_ascii_case("true")
}

/// Interpret a search body. `Response: "False"` is a not-found answer whatever its message.
pub fn parse_search_response(body: &str) -> Result<Vec<MovieSummary>, SourceError> {
    let parsed: OmdbSearchResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Decode(e.to_string()))?;

    if !is_true(&parsed.response) {
        let message = parsed.error.unwrap_or_else(|| "Movie not found!".to_string());
        return Err(SourceError::NotFound(message));
    }

    Ok(parsed
        .search
        .into_iter()
        .map(|item| MovieSummary {
            id: item.imdb_id,
            title: item.title,
            year: item.year,
            poster_url: item.poster,
        })
        .collect())
}

/// Interpret a detail body for `requested_id`.
pub fn parse_detail_response(body: &str, requested_id: &str) -> Result<MovieDetail, SourceError> {
    let parsed: OmdbDetailResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Decode(e.to_string()))?;

    if let Some(response) = parsed.response.as_deref() {
        if !is_true(response) {
            let message = parsed.error.unwrap_or_else(|| "Incorrect IMDb ID.".to_string());
            return Err(SourceError::NotFound(message));
        }
    }

    let id = if parsed.imdb_id.is_empty() {
        requested_id.to_string()
    } else {
        parsed.imdb_id
    };

    Ok(MovieDetail {
        id,
        title: parsed.title,
        year: parsed.year,
        poster_url: parsed.poster,
        runtime: parsed.runtime,
        imdb_rating: parse_imdb_rating(&parsed.imdb_rating),
        plot: parsed.plot,
        released: parsed.released,
        actors: parsed.actors,
        director: parsed.director,
        genre: parsed.genre,
    })
}

async fn fetch_body(client: &Client, url: &str) -> Result<String, SourceError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(SourceError::Transport(format!("{} - {}", status, error_text)));
    }

    Ok(response.text().await?)
}

/// Search OMDb by title
pub async fn search(
    client: &Client,
    base_url: &str,
    api_key: &str,
    term: &str,
) -> Result<Vec<MovieSummary>, SourceError> {
    debug!(term, "OMDb search request");
    let body = fetch_body(client, &search_url(base_url, api_key, term)).await?;
    let results = parse_search_response(&body)?;
    debug!(term, count = results.len(), "OMDb search response");
    Ok(results)
}

/// Fetch the full record for one IMDb id
pub async fn get_detail(
    client: &Client,
    base_url: &str,
    api_key: &str,
    id: &str,
) -> Result<MovieDetail, SourceError> {
    debug!(id, "OMDb detail request");
    let body = fetch_body(client, &detail_url(base_url, api_key, id)).await?;
    parse_detail_response(&body, id)
}
