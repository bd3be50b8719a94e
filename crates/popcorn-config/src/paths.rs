use anyhow::Result;
use std::path::PathBuf;

/// Base directory override from `POPCORN_HOME`, if set.
pub fn home_override() -> Option<PathBuf> {
    std::env::var_os("POPCORN_HOME").map(PathBuf::from)
}

pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("popcorn");

        Ok(Self::from_base(base_dir))
    }

    /// Config files at the base, data and logs in subdirectories.
    pub fn from_base(base: PathBuf) -> Self {
        Self {
            config_dir: base.clone(),
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
        }
    }

    /// Directory backing the key-value store (one JSON file per key)
    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.join("storage")
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.config_dir.join("credentials.toml")
    }

    pub fn browse_log_file(&self) -> PathBuf {
        self.log_dir.join("popcorn.log")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        std::fs::create_dir_all(self.storage_dir())?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        if let Some(base) = home_override() {
            return Self::from_base(base);
        }

        // Platform-specific paths (e.g., ~/.config/popcorn on Linux), falling back to ./.popcorn
        Self::new().unwrap_or_else(|_| Self::from_base(PathBuf::from(".popcorn")))
    }
}
