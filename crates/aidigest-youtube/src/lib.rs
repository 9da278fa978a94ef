pub mod client;
pub mod error;
pub mod harvester;
mod retry;
pub mod transcript;
pub mod types;

pub use client::YoutubeClient;
pub use error::YoutubeError;
pub use harvester::YoutubeHarvester;
