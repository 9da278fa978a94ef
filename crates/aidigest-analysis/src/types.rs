//! Wire types for the OpenAI-compatible completion API and the structured
//! payloads the harvesters hand to the client.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatReply,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatReply {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Usage {
    #[serde(default)]
    pub total_tokens: u64,
}

/// Everything the repository prompt is built from. Oversized fields are
/// truncated deterministically at prompt-build time, never rejected.
#[derive(Debug, Clone, Default)]
pub struct RepoPayload {
    pub full_name: String,
    pub description: String,
    pub language: String,
    pub stars: i64,
    pub readme: String,
    /// `(file name, contents)` pairs for representative source files.
    pub code_files: Vec<(String, String)>,
}

/// Everything the video prompt is built from. `transcript` of `None` selects
/// the degraded description + top-comments path.
#[derive(Debug, Clone, Default)]
pub struct VideoPayload {
    pub title: String,
    pub channel: String,
    pub description: String,
    pub view_count: i64,
    pub duration: String,
    pub transcript: Option<String>,
    pub top_comments: Vec<String>,
}
