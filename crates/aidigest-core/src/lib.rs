pub mod app_config;
pub mod config;
pub mod digest;
pub mod keywords;
pub mod run;
pub mod traits;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use digest::{
    DigestBrief, DigestRecord, Enrichment, RepoAnalysis, RepoItem, VideoAnalysis, VideoItem,
};
pub use keywords::KeywordSet;
pub use run::{ExecutionLogEntry, RunStatus};
pub use traits::{DigestStore, Notifier, NotifyError, RepoSource, StoreError, VideoSource};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid run status: {0}")]
    InvalidRunStatus(String),
}
