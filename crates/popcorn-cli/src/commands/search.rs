use super::{spinner, AppContext};
use crate::output::Output;
use color_eyre::Result;
use popcorn_core::{SearchFailure, SearchViewState, Session};
use std::sync::Arc;

pub async fn run_search(term: &str, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let client = Arc::new(ctx.client()?);
    let mut session = Session::new(client, ctx.watched_store(), ctx.config.debounce_window());

    tracing::debug!(term = %term, "Search command started");
    let progress = spinner(output, &format!("Searching for \"{}\"...", term));
    session.search_now(term);
    session.settle().await;
    progress.finish_and_clear();

    match session.search().state() {
        SearchViewState::Ready(results) => {
            output.results(results);
            Ok(())
        }
        SearchViewState::Failed(SearchFailure::NotFound) => {
            output.warn(SearchFailure::NotFound.message());
            Ok(())
        }
        SearchViewState::Failed(failure) => Err(color_eyre::eyre::eyre!("{}", failure)),
        SearchViewState::Idle | SearchViewState::Loading => {
            output.warn("Nothing to search for");
            Ok(())
        }
    }
}
