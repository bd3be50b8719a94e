pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{ApiConfig, Config, SearchConfig, StorageConfig, API_KEY_ENV, DEFAULT_BASE_URL};
pub use credentials::CredentialStore;
pub use paths::{PathManager, home_override};
