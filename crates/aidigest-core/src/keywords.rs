//! Search keyword sets for both harvesters, loadable from a YAML file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Keywords driving source queries: `repo` terms feed the code-hosting search
/// (and double as the AI-relatedness filter over trending candidates), `video`
/// terms feed the video-platform search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSet {
    #[serde(default)]
    pub repo: Vec<String>,
    #[serde(default)]
    pub video: Vec<String>,
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self {
            repo: [
                "ai agent",
                "llm",
                "agent framework",
                "rag",
                "autonomous agent",
                "multi-agent",
                "model context protocol",
                "ai coding assistant",
                "inference",
                "fine-tune",
            ]
            .map(str::to_owned)
            .to_vec(),
            video: [
                "AI agent 2025",
                "LLM agent tutorial",
                "autonomous AI agent",
                "multi-agent AI system",
                "AI coding agent",
                "agentic AI workflow",
                "AI reasoning breakthrough",
                "AI automation agent",
            ]
            .map(str::to_owned)
            .to_vec(),
        }
    }
}

impl KeywordSet {
    /// Load a keyword set from a YAML file. A missing file falls back to the
    /// built-in defaults; a malformed file is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidKeywordsFile`] if the file exists but
    /// cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidKeywordsFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let set: KeywordSet =
            serde_yaml::from_str(&raw).map_err(|e| ConfigError::InvalidKeywordsFile {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(set)
    }

    /// Case-insensitive AI-relatedness check against the repo keyword list.
    #[must_use]
    pub fn matches_repo(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.repo.iter().any(|kw| lowered.contains(&kw.to_lowercase()))
    }
}
