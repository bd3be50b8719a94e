use clap::{ArgAction, Parser, Subcommand};
use commands::{browse, clear, config, details, search, watched};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "popcorn")]
#[command(about = "usePopcorn - search movies and keep a rated list of what you've watched")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to this file (rotated daily) instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search movies by title
    #[command(long_about = "Run a single title search against the movie database and print the matches in the order the service returns them.")]
    Search {
        /// Title or part of a title
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,
    },
    /// Show details for one movie
    #[command(long_about = "Fetch and print the full details of a movie by its IMDb id (e.g. tt1375666).")]
    Details {
        /// IMDb id
        id: String,
    },
    /// Interactive search, rate and watch-list session
    #[command(long_about = "Start an interactive session. Plain lines are treated as the search box contents and are searched after a short pause. Lines starting with ':' are commands; type :help for the list. Logs go to the browse log file unless --log-file is given.")]
    Browse,
    /// Inspect or edit the watched list
    #[command(long_about = "Show the watched list, remove an entry, or print the summary statistics. Running without a subcommand lists the entries.")]
    Watched {
        #[command(subcommand)]
        cmd: Option<WatchedCommands>,
    },
    /// Configure the API key and settings
    #[command(long_about = "Manage configuration and the OMDb API key. Running without a subcommand shows the current configuration.")]
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
    /// Clear stored data
    #[command(long_about = "Delete the persisted watched list or the stored credentials. Use --watched, --credentials, or --all for both.")]
    Clear {
        /// Clear the watched list and credentials
        #[arg(long, action = ArgAction::SetTrue, conflicts_with_all = ["watched", "credentials"])]
        all: bool,

        /// Clear the persisted watched list
        #[arg(long, action = ArgAction::SetTrue)]
        watched: bool,

        /// Clear stored credentials
        #[arg(long, action = ArgAction::SetTrue)]
        credentials: bool,
    },
}

#[derive(Subcommand)]
pub enum WatchedCommands {
    /// List watched movies
    List,
    /// Remove a movie from the watched list
    Remove {
        /// IMDb id
        id: String,
    },
    /// Count and average ratings and runtime
    Summary,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks the API key)
    #[command(long_about = "Display the current configuration and where the API key comes from. The key is masked unless --full is given.")]
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },

    /// Write a configuration file interactively
    #[command(long_about = "Create or update config.toml by prompting for the API endpoint, debounce window and storage key.")]
    Init,

    /// Store the OMDb API key in the credentials file
    #[command(long_about = "Save the OMDb API key to credentials.toml. Get a free key at https://www.omdbapi.com/apikey.aspx. The POPCORN_OMDB_API_KEY environment variable still takes precedence.")]
    ApiKey {
        /// API key (if not provided, will prompt)
        #[arg(long)]
        key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // Browse owns the terminal, so its logs go to a file unless told otherwise
    let log_file = match (&cli.command, cli.log_file) {
        (Commands::Browse, None) => Some(popcorn_config::PathManager::default().browse_log_file()),
        (_, log_file) => log_file,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Search { term } => search::run_search(&term.join(" "), &output).await,
        Commands::Details { id } => details::run_details(&id, &output).await,
        Commands::Browse => browse::run_browse(&output).await,
        Commands::Watched { cmd } => watched::run_watched(cmd.unwrap_or(WatchedCommands::List), &output),
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show { full: false });
            config::run_config(cmd, &output)
        }
        Commands::Clear { all, watched, credentials } => clear::run_clear(all, watched, credentials, &output),
    }
}
