//! Interactive terminal session.
//!
//! Stdin is read on a dedicated thread and translated into `UiEvent`s; the
//! session loop runs on the main task and the screen prints whatever changed
//! after each wake-up. The reader sees the latest result and watched ids
//! through a `watch` channel so `:open 2` can name a row by number.

use super::AppContext;
use crate::output::Output;
use color_eyre::Result;
use popcorn_core::{
    DetailState, JsonFileStore, Key, Notice, SearchViewState, SelectionState, Session, UiEvent, APP_TITLE,
};
use popcorn_models::{WatchedEntry, WatchedSummary};
use popcorn_sources::OmdbClient;
use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

type BrowseSession = Session<OmdbClient, JsonFileStore>;

const HELP: &str = "\
Type a title to search (results appear after a short pause).
  :open <n|id>   show details for result n or an IMDb id
  :rate <1-10>   rate the open movie
  :add           add the open movie to your watched list
  :close         close the details (:esc does the same via Escape)
  :enter         press Enter outside the search box
  :rm <n|id>     remove watched entry n or an IMDb id
  :watched       show the watched list
  :help          show this help
  :quit          leave";

/// What the input thread needs to resolve row numbers.
#[derive(Debug, Clone, Default, PartialEq)]
struct Snapshot {
    results: Vec<String>,
    watched: Vec<WatchedEntry>,
}

impl Snapshot {
    fn of(session: &BrowseSession) -> Self {
        Self {
            results: session.search().results().iter().map(|m| m.id.clone()).collect(),
            watched: session.watched().entries().to_vec(),
        }
    }
}

#[derive(Debug, PartialEq)]
enum Line {
    Events(Vec<UiEvent>),
    ShowWatched,
    Help,
    Quit,
    Invalid(String),
}

pub async fn run_browse(output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let client = Arc::new(ctx.client()?);
    let mut session = Session::new(client, ctx.watched_store(), ctx.config.debounce_window());
    tracing::info!("Browse session started");

    output.info(format!("🍿 {} (type to search, :help for commands)", APP_TITLE));
    output.summary(&session.summary());

    let (events_tx, events_rx) = mpsc::channel(32);
    let (view_tx, view_rx) = watch::channel(Snapshot::of(&session));
    let reader_output = output.clone();
    std::thread::spawn(move || read_lines(events_tx, view_rx, reader_output));

    let mut screen = Screen::new(output.clone(), &session, view_tx);
    session
        .run(events_rx, |session, notices| screen.render(session, notices))
        .await;

    tracing::info!("Browse session ended");
    output.summary(&session.summary());
    Ok(())
}

/// Blocking line reader. Dropping `tx` on exit ends the session loop.
fn read_lines(tx: mpsc::Sender<UiEvent>, view: watch::Receiver<Snapshot>, output: Output) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Failed to read input: {}", e);
                break;
            }
        };

        let parsed = parse_line(&line, &view.borrow());
        match parsed {
            Line::Events(events) => {
                for event in events {
                    if tx.blocking_send(event).is_err() {
                        return;
                    }
                }
            }
            Line::ShowWatched => {
                let watched = view.borrow().watched.clone();
                output.watched(&watched, &WatchedSummary::from_entries(&watched));
            }
            Line::Help => output.info(HELP),
            Line::Invalid(message) => output.warn(message),
            Line::Quit => break,
        }
    }
}

fn parse_line(line: &str, view: &Snapshot) -> Line {
    let Some(command) = line.strip_prefix(':') else {
        // Typing into the search box focuses it
        return Line::Events(vec![UiEvent::Focus(true), UiEvent::Query(line.to_string())]);
    };

    let (name, arg) = match command.trim().split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command.trim(), ""),
    };

    match name {
        "open" | "o" => {
            let ids: Vec<&str> = view.results.iter().map(String::as_str).collect();
            match resolve(arg, &ids) {
                // Clicking a movie takes focus away from the search box
                Some(id) => Line::Events(vec![UiEvent::Focus(false), UiEvent::Select(id)]),
                None => Line::Invalid(format!("No result {:?}; use a row number or an IMDb id", arg)),
            }
        }
        "rate" | "r" => match arg.parse::<u8>() {
            Ok(value) => Line::Events(vec![UiEvent::Rate(value)]),
            Err(_) => Line::Invalid(format!("Rating must be a number from 1 to 10, got {:?}", arg)),
        },
        "add" | "a" => Line::Events(vec![UiEvent::Commit]),
        "close" | "c" => Line::Events(vec![UiEvent::Close]),
        "esc" => Line::Events(vec![UiEvent::Key(Key::Escape)]),
        "enter" => Line::Events(vec![UiEvent::Key(Key::Enter)]),
        "rm" => {
            let ids: Vec<&str> = view.watched.iter().map(|e| e.id.as_str()).collect();
            match resolve(arg, &ids) {
                Some(id) => Line::Events(vec![UiEvent::Remove(id)]),
                None => Line::Invalid(format!("No watched entry {:?}; use a row number or an IMDb id", arg)),
            }
        }
        "watched" | "w" => Line::ShowWatched,
        "help" | "h" | "?" => Line::Help,
        "quit" | "q" => Line::Quit,
        other => Line::Invalid(format!("Unknown command :{} (try :help)", other)),
    }
}

/// A 1-based row number into `ids`, or any other text taken as an id.
fn resolve(arg: &str, ids: &[&str]) -> Option<String> {
    if arg.is_empty() {
        return None;
    }
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => ids.get(n - 1).map(|id| id.to_string()),
        Ok(_) => None,
        Err(_) => Some(arg.to_string()),
    }
}

/// Prints the parts of the session that changed since the last render.
struct Screen {
    output: Output,
    search: SearchViewState,
    selection: SelectionState,
    watched_len: usize,
    title: String,
    view: watch::Sender<Snapshot>,
}

impl Screen {
    fn new(output: Output, session: &BrowseSession, view: watch::Sender<Snapshot>) -> Self {
        Self {
            output,
            search: session.search().state().clone(),
            selection: session.selection().state().clone(),
            watched_len: session.watched().len(),
            title: session.title(),
            view,
        }
    }

    fn render(&mut self, session: &BrowseSession, notices: Vec<Notice>) {
        if session.search().state() != &self.search {
            self.render_search(session.search().state());
            self.search = session.search().state().clone();
        }

        if session.selection().state() != &self.selection {
            self.render_selection(session);
            self.selection = session.selection().state().clone();
        }

        for notice in notices {
            match notice {
                Notice::StorageWarning(message) | Notice::Rejected(message) => self.output.warn(message),
                Notice::Added(entry) => self.output.success(format!(
                    "Added {} to your watched list, rated {}",
                    entry.title, entry.user_rating
                )),
            }
        }

        if session.watched().len() != self.watched_len {
            self.watched_len = session.watched().len();
            self.output.summary(&session.summary());
        }

        let title = session.title();
        if title != self.title {
            tracing::debug!(title = %title, "Title changed");
            self.title = title;
        }

        self.view.send_replace(Snapshot::of(session));
    }

    fn render_search(&self, state: &SearchViewState) {
        match state {
            SearchViewState::Idle => {}
            SearchViewState::Loading => self.output.info("Loading..."),
            SearchViewState::Ready(results) => self.output.results(results),
            SearchViewState::Failed(failure) => self.output.error(failure.message()),
        }
    }

    fn render_selection(&self, session: &BrowseSession) {
        let SelectionState::Open(open) = session.selection().state() else {
            return;
        };
        let previous = match &self.selection {
            SelectionState::Open(prev) if prev.id == open.id => Some(prev),
            _ => None,
        };

        if previous.map(|p| &p.detail) != Some(&open.detail) {
            match &open.detail {
                DetailState::Loading => self.output.info("Loading details..."),
                DetailState::Loaded(detail) => {
                    let rating = session.watched_rating();
                    self.output.detail(detail, rating);
                    if rating.is_none() {
                        self.output.info("Rate it with :rate <1-10>, then :add");
                    }
                }
                DetailState::Failed(failure) => self.output.error(failure.to_string()),
            }
        } else if let Some(rating) = open.pending_rating {
            if previous.and_then(|p| p.pending_rating) != Some(rating) {
                self.output.info(format!("Your rating: {} ⭐️ (:add to add to your list)", rating));
            }
        }
    }
}
