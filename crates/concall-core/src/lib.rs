pub mod app_config;
pub mod config;
pub mod path;
pub mod record;
pub mod summary;
pub mod watchlist;

pub use app_config::{AppConfig, NotifySettings};
pub use config::{load_app_config, load_app_config_from_env};
pub use path::DestinationPath;
pub use record::{Quarter, TranscriptRecord};
pub use summary::{FailureDetail, RunSummary, SyncOutcome};
pub use watchlist::{load_watchlist, WatchedEntity, WatchlistFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read watchlist file {path}: {source}")]
    WatchlistIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse watchlist file: {0}")]
    WatchlistParse(serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}
