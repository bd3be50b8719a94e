use super::prompts;
use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use color_eyre::Result;
use comfy_table::{modifiers, presets, Attribute, Cell, Color, Table};
use popcorn_config::{Config, CredentialStore, PathManager, API_KEY_ENV};
use serde_json::json;

pub fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, output),
        ConfigCommands::Init => init_config(output),
        ConfigCommands::ApiKey { key } => configure_api_key(key, output),
    }
}

/// Where the effective API key comes from, mirroring `Config::resolve_api_key`.
fn key_source(config: &Config, credentials: &CredentialStore) -> &'static str {
    if std::env::var(API_KEY_ENV).map(|k| !k.is_empty()).unwrap_or(false) {
        "environment"
    } else if credentials.get_omdb_api_key().is_some() {
        "credentials.toml"
    } else if config.api.api_key.as_deref().map(|k| !k.is_empty()).unwrap_or(false) {
        "config.toml"
    } else {
        "not set"
    }
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    let config = Config::load_or_default(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    let mut credentials = CredentialStore::new(path_manager.credentials_file());
    credentials
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;

    let api_key = config.resolve_api_key(&credentials);
    let api_key_display = match &api_key {
        Some(key) if full => key.clone(),
        Some(key) => mask_string(key),
        None => mask_string(""),
    };
    let source = key_source(&config, &credentials);

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            if !config_file.exists() {
                output.warn(format!(
                    "No configuration file at {}; showing defaults. Run 'popcorn config init' to create one.",
                    config_file.display()
                ));
            }

            let mut table = Table::new();
            table.set_header(vec![
                Cell::new("Setting").fg(Color::Cyan).add_attribute(Attribute::Bold),
                Cell::new("Value").fg(Color::Cyan).add_attribute(Attribute::Bold),
            ]);
            table.add_row(vec![Cell::new("Config file"), Cell::new(config_file.display())]);
            table.add_row(vec![Cell::new("API base URL"), Cell::new(&config.api.base_url)]);
            table.add_row(vec![
                Cell::new("API key"),
                Cell::new(format!("{} ({})", api_key_display, source)),
            ]);
            table.add_row(vec![
                Cell::new("Search debounce"),
                Cell::new(format!("{} ms", config.search.debounce_ms)),
            ]);
            table.add_row(vec![Cell::new("Watched list key"), Cell::new(&config.storage.watched_key)]);
            table.add_row(vec![
                Cell::new("Storage directory"),
                Cell::new(path_manager.storage_dir().display()),
            ]);
            table.load_preset(presets::UTF8_FULL);
            table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
            println!("{}", table);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": config_file.display().to_string(),
                "exists": config_file.exists(),
                "api": {
                    "base_url": config.api.base_url,
                    "api_key": api_key.as_ref().map(|_| api_key_display.clone()),
                    "api_key_source": source,
                },
                "search": { "debounce_ms": config.search.debounce_ms },
                "storage": {
                    "watched_key": config.storage.watched_key,
                    "dir": path_manager.storage_dir().display().to_string(),
                },
            }));
        }
    }

    Ok(())
}

fn init_config(output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;

    let config_file = path_manager.config_file();
    let mut config = Config::load_or_default(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

    output.info("usePopcorn configuration");
    config.api.base_url = prompts::prompt_string("OMDb API base URL", Some(&config.api.base_url))?
        .trim()
        .to_string();
    config.search.debounce_ms = prompts::prompt_positive("Search debounce (ms)", config.search.debounce_ms)?;
    config.storage.watched_key = prompts::prompt_string("Watched list storage key", Some(&config.storage.watched_key))?
        .trim()
        .to_string();

    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Configuration not saved: {}", e))?;
    config
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_file.display(), e))?;
    output.success(format!("Configuration saved to {}", config_file.display()));

    let mut credentials = CredentialStore::new(path_manager.credentials_file());
    credentials
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;
    if config.resolve_api_key(&credentials).is_none()
        && prompts::prompt_yes_no("No OMDb API key is configured. Set one now?", Some(true))?
    {
        configure_api_key(None, output)?;
    }

    Ok(())
}

fn configure_api_key(key_arg: Option<String>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;

    let key = match key_arg {
        Some(key) => key.trim().to_string(),
        None => {
            output.info("Get a free key at https://www.omdbapi.com/apikey.aspx");
            prompts::prompt_secret("OMDb API key")?
        }
    };
    if key.is_empty() {
        return Err(color_eyre::eyre::eyre!("API key cannot be empty"));
    }

    let credentials_file = path_manager.credentials_file();
    let mut credentials = CredentialStore::new(credentials_file.clone());
    credentials
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;
    credentials.set_omdb_api_key(key);
    credentials
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials to {}: {}", credentials_file.display(), e))?;

    output.success(format!("API key saved to {}", credentials_file.display()));
    if std::env::var(API_KEY_ENV).is_ok() {
        output.warn(format!("{} is set and takes precedence over the stored key", API_KEY_ENV));
    }
    Ok(())
}
