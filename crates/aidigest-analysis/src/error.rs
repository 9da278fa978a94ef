use thiserror::Error;

/// Errors returned by the analysis client.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The completion API returned a non-2xx status.
    #[error("completion API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The model's reply could not be parsed into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The completion API returned no choices.
    #[error("completion API returned an empty response")]
    EmptyResponse,

    /// No API key configured; analysis is disabled.
    #[error("analysis client is not configured")]
    Unavailable,
}
