//! HTTP client for the OpenAI-compatible completion API.
//!
//! One enrichment request per digest item. The client owns the retry/back-off
//! policy and the model-fallback plan; callers treat any error as "item stays
//! unenriched" and never abort their batch over it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use aidigest_core::{RepoAnalysis, VideoAnalysis};

use crate::error::AnalysisError;
use crate::parse::parse_model_json;
use crate::prompt::{build_repo_prompt, build_video_prompt};
use crate::retry::retry_with_backoff;
use crate::types::{ChatMessage, ChatRequest, ChatResponse, RepoPayload, ResponseFormat, VideoPayload};

/// One entry of the model-fallback plan: try `model` up to `max_attempts`
/// times before moving to the next entry.
#[derive(Debug, Clone)]
pub struct ModelAttempts {
    pub model: String,
    pub max_attempts: u32,
}

impl ModelAttempts {
    /// Builds the ordered plan: the primary model with its full attempt
    /// budget, then each fallback exactly once, in declared order.
    #[must_use]
    pub fn plan(primary: &str, primary_attempts: u32, fallbacks: &[String]) -> Vec<Self> {
        let mut plan = vec![Self {
            model: primary.to_owned(),
            max_attempts: primary_attempts.max(1),
        }];
        plan.extend(fallbacks.iter().map(|model| Self {
            model: model.clone(),
            max_attempts: 1,
        }));
        plan
    }
}

/// Stateless wrapper around the completion endpoint.
pub struct AnalysisClient {
    http: Client,
    api_key: Option<String>,
    base_url: String,
    plan: Vec<ModelAttempts>,
    backoff_base_ms: u64,
    tokens_used: AtomicU64,
}

impl AnalysisClient {
    /// Creates a new client. `api_key` of `None` builds a disabled client
    /// whose `analyze_*` calls return [`AnalysisError::Unavailable`].
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: Option<&str>,
        base_url: &str,
        plan: Vec<ModelAttempts>,
        backoff_base_ms: u64,
        timeout_secs: u64,
    ) -> Result<Self, AnalysisError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("aidigest/0.1 (digest-enrichment)")
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.map(str::to_owned),
            base_url: base_url.trim_end_matches('/').to_owned(),
            plan,
            backoff_base_ms,
            tokens_used: AtomicU64::new(0),
        })
    }

    /// Whether the client holds credentials. A disabled client is a valid
    /// state: harvesters skip enrichment and keep items unenriched.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    /// Total tokens consumed since construction or the last reset.
    /// Observability side channel, not a correctness input.
    #[must_use]
    pub fn tokens_used(&self) -> u64 {
        self.tokens_used.load(Ordering::Relaxed)
    }

    pub fn reset_tokens_used(&self) {
        self.tokens_used.store(0, Ordering::Relaxed);
    }

    /// Analyzes one repository.
    ///
    /// # Errors
    ///
    /// Returns the last model's error once the whole fallback plan is
    /// exhausted, or [`AnalysisError::Unavailable`] when unconfigured.
    pub async fn analyze_repo(&self, payload: &RepoPayload) -> Result<RepoAnalysis, AnalysisError> {
        let prompt = build_repo_prompt(payload);
        self.complete_json(&prompt, &payload.full_name).await
    }

    /// Analyzes one video.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::analyze_repo`].
    pub async fn analyze_video(
        &self,
        payload: &VideoPayload,
    ) -> Result<VideoAnalysis, AnalysisError> {
        let prompt = build_video_prompt(payload);
        self.complete_json(&prompt, &payload.title).await
    }

    /// Drives the fallback plan: each `(model, max_attempts)` entry runs
    /// through one retry loop; the first parseable reply wins.
    async fn complete_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        context: &str,
    ) -> Result<T, AnalysisError> {
        if !self.is_available() {
            return Err(AnalysisError::Unavailable);
        }

        let mut last_err = AnalysisError::Unavailable;
        for entry in &self.plan {
            let outcome = retry_with_backoff(entry.max_attempts, self.backoff_base_ms, || {
                self.chat_once(&entry.model, prompt)
            })
            .await;

            match outcome {
                Ok(reply) => match parse_model_json::<T>(&reply) {
                    Ok(parsed) => return Ok(parsed),
                    Err(source) => {
                        tracing::warn!(
                            model = %entry.model,
                            context,
                            error = %source,
                            "model reply was not valid JSON, trying next model"
                        );
                        last_err = AnalysisError::Deserialize {
                            context: context.to_owned(),
                            source,
                        };
                    }
                },
                Err(err) => {
                    tracing::warn!(
                        model = %entry.model,
                        context,
                        error = %err,
                        "model exhausted its attempt budget, trying next model"
                    );
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }

    /// One completion request. Non-2xx statuses are surfaced with their body
    /// so the retry policy can distinguish 429/5xx from hard rejections.
    async fn chat_once(&self, model: &str, prompt: &str) -> Result<String, AnalysisError> {
        let request = ChatRequest {
            model: model.to_owned(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_owned(),
            }],
            temperature: 0.3,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let url = format!("{}/chat/completions", self.base_url);
        let api_key = self.api_key.as_deref().unwrap_or_default();
        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        if let Some(usage) = &parsed.usage {
            self.tokens_used
                .fetch_add(usage.total_tokens, Ordering::Relaxed);
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(AnalysisError::EmptyResponse)
    }
}
