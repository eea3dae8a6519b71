pub mod app_config;
pub mod config;
pub mod context;
pub mod phone;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, BrowserSettings, ProbeSettings};
pub use config::{load_app_config, load_app_config_from_env};
pub use context::RunContext;
pub use phone::PhoneNormalizer;
pub use types::{
    area_slug, BusinessCandidate, BusinessRecord, ContactVerificationRecord, ListRow,
    SearchQuery, VerificationRow, DEFAULT_CITY, DEFAULT_COUNTRY, DEFAULT_SEARCH_TYPE,
    KNOWN_SEARCH_TYPES,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
