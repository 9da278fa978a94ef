pub mod client;
pub mod error;
pub mod parse;
pub mod prompt;
mod retry;
pub mod types;

pub use client::{AnalysisClient, ModelAttempts};
pub use error::AnalysisError;
pub use types::{RepoPayload, VideoPayload};
