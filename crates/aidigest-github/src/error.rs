use thiserror::Error;

/// Errors returned by the GitHub client.
#[derive(Debug, Error)]
pub enum GithubError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limited by the API (403 with rate-limit headers or 429).
    #[error("rate limited by GitHub (status {status})")]
    RateLimited { status: u16 },

    /// Non-2xx HTTP status outside the rate-limit family.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
