pub mod client;
pub mod error;
pub mod harvester;
mod ranking;
mod retry;
pub mod trending;
pub mod types;

pub use client::GithubClient;
pub use error::GithubError;
pub use harvester::GithubHarvester;
