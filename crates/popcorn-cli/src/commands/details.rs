use super::{spinner, AppContext};
use crate::output::Output;
use color_eyre::Result;
use popcorn_core::DetailFailure;
use popcorn_sources::{MovieSearchClient, SourceError};

pub async fn run_details(id: &str, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let client = ctx.client()?;
    let watched = ctx.watched_store();

    let progress = spinner(output, &format!("Fetching {}...", id));
    let outcome = client.get_details(id).await;
    progress.finish_and_clear();

    match outcome {
        Ok(detail) => {
            let rating = watched.get(&detail.id).map(|entry| entry.user_rating);
            output.detail(&detail, rating);
            Ok(())
        }
        Err(SourceError::NotFound(message)) => {
            output.warn(DetailFailure::NotFound(message).to_string());
            Ok(())
        }
        Err(e) => {
            tracing::warn!(id = %id, "Failed to fetch movie details: {}", e);
            Err(color_eyre::eyre::eyre!("{}", DetailFailure::Transport))
        }
    }
}
