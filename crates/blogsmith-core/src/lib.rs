use thiserror::Error;

pub mod app_config;
pub mod campaign;
pub mod config;
pub mod products;
pub mod schedule;
pub mod state;
pub mod stores;

pub use app_config::{AppConfig, Environment};
pub use campaign::{
    normalize_keywords, ArticleStatus, CampaignConfigError, CampaignSettings, CampaignStatus,
    ExecutionStatus, Frequency, TriggerSource,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{Product, ProductAttributes, ProductLink};
pub use schedule::{advance_after_run, first_run_at_or_after, is_due, next_run};
pub use state::{CampaignEvent, TransitionError};
pub use stores::{load_stores, StoreConfig, StoresFile};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid campaign status: {0}")]
    InvalidStatus(String),
    #[error("invalid frequency: {0}")]
    InvalidFrequency(String),
    #[error("invalid campaign event: {0}")]
    InvalidEvent(String),
    #[error("invalid article status: {0}")]
    InvalidArticleStatus(String),
    #[error("invalid execution status: {0}")]
    InvalidExecutionStatus(String),
    #[error("invalid trigger source: {0}")]
    InvalidTriggerSource(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read stores file at {path}: {source}")]
    StoresFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse stores file: {0}")]
    StoresFileParse(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Validation(String),
}
