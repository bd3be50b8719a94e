use clap::ValueEnum;
use comfy_table::{modifiers, presets, Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use popcorn_models::{MovieDetail, MovieSummary, UserRating, WatchedEntry, WatchedSummary};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

#[derive(Clone)]
pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => println!("{} {}", "✓".green(), msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "success", "message": msg.as_ref() }));
            }
        }
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        // Errors should always be shown, even in quiet mode
        match self.format {
            OutputFormat::Human => eprintln!("{} {}", "✗".red(), msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "error", "message": msg.as_ref() }));
            }
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => println!("{}", msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "info", "message": msg.as_ref() }));
            }
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => println!("{} {}", "⚠".yellow(), msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "warning", "message": msg.as_ref() }));
            }
        }
    }

    pub fn json(&self, data: &serde_json::Value) {
        if self.quiet && self.format != OutputFormat::Human {
            return;
        }

        self.print_json(data);
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(data).unwrap_or_default()),
            OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(data).unwrap_or_default()),
            OutputFormat::Human => println!("{}", data),
        }
    }

    pub fn results(&self, results: &[MovieSummary]) {
        match self.format {
            OutputFormat::Human => {
                if self.quiet {
                    return;
                }
                println!("Found {} results", results.len().to_string().bold());
                if !results.is_empty() {
                    println!("{}", results_table(results));
                }
            }
            _ => self.json(&json!({ "type": "results", "count": results.len(), "results": results })),
        }
    }

    pub fn detail(&self, detail: &MovieDetail, watched_rating: Option<UserRating>) {
        match self.format {
            OutputFormat::Human => {
                if self.quiet {
                    return;
                }
                println!("{}", detail_table(detail));
                println!("{}", detail.plot.italic());
                println!("Starring {}", detail.actors);
                println!("Directed by {}", detail.director);
                if let Some(rating) = watched_rating {
                    println!("You rated this movie {} ⭐️", rating.to_string().bright_yellow());
                }
            }
            _ => self.json(&json!({
                "type": "detail",
                "movie": detail,
                "userRating": watched_rating,
            })),
        }
    }

    pub fn watched(&self, entries: &[WatchedEntry], summary: &WatchedSummary) {
        match self.format {
            OutputFormat::Human => {
                if self.quiet {
                    return;
                }
                println!("{}", summary_line(summary));
                if !entries.is_empty() {
                    println!("{}", watched_table(entries));
                }
            }
            _ => self.json(&json!({ "type": "watched", "summary": summary, "entries": entries })),
        }
    }

    pub fn summary(&self, summary: &WatchedSummary) {
        match self.format {
            OutputFormat::Human => self.info(summary_line(summary)),
            _ => self.json(&json!({ "type": "summary", "summary": summary })),
        }
    }
}

/// Average with `decimals` places, or "-" when there is nothing to average.
pub fn format_avg(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "-".to_string(),
    }
}

pub fn summary_line(summary: &WatchedSummary) -> String {
    format!(
        "#️⃣ {} movies  ⭐️ {}  🌟 {}  ⏳ {} min",
        summary.count,
        format_avg(summary.avg_imdb_rating, 2),
        format_avg(summary.avg_user_rating, 2),
        format_avg(summary.avg_runtime, 0),
    )
}

fn styled(mut table: Table) -> Table {
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table
}

fn header(cells: &[&str]) -> Vec<Cell> {
    cells
        .iter()
        .map(|c| Cell::new(c).fg(Color::Cyan).add_attribute(Attribute::Bold))
        .collect()
}

pub fn results_table(results: &[MovieSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(header(&["#", "Title", "Year", "IMDb id"]));
    for (i, movie) in results.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&movie.title),
            Cell::new(format!("🗓 {}", movie.year)),
            Cell::new(&movie.id),
        ]);
    }
    styled(table)
}

pub fn detail_table(detail: &MovieDetail) -> Table {
    let mut table = Table::new();
    table.set_header(vec![Cell::new(&detail.title)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)]);
    table.add_row(vec![Cell::new("Released"), Cell::new(&detail.released)]);
    table.add_row(vec![Cell::new("Runtime"), Cell::new(&detail.runtime)]);
    table.add_row(vec![Cell::new("Genre"), Cell::new(&detail.genre)]);
    table.add_row(vec![
        Cell::new("IMDb rating"),
        Cell::new(format!("⭐️ {}", format_avg(detail.imdb_rating, 1))),
    ]);
    table.add_row(vec![Cell::new("IMDb id"), Cell::new(&detail.id)]);
    styled(table)
}

pub fn watched_table(entries: &[WatchedEntry]) -> Table {
    let mut table = Table::new();
    table.set_header(header(&["Title", "⭐️ IMDb", "🌟 Yours", "⏳ Runtime", "IMDb id"]));
    for entry in entries {
        table.add_row(vec![
            Cell::new(&entry.title),
            Cell::new(format_avg(entry.imdb_rating, 1)),
            Cell::new(entry.user_rating),
            Cell::new(format!("{} min", entry.runtime_minutes)),
            Cell::new(&entry.id),
        ]);
    }
    styled(table)
}
