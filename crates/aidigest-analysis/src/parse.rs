//! Extraction of structured JSON from model replies.
//!
//! Even in JSON mode some models wrap their output in a Markdown code fence;
//! the fence is stripped before deserialization.

use regex::Regex;
use serde::de::DeserializeOwned;

/// Parses a model reply into `T`, tolerating a ```` ```json ```` fence around
/// the payload.
///
/// # Errors
///
/// Returns the underlying `serde_json` error if the (unfenced) text is not
/// valid JSON of the expected shape.
pub fn parse_model_json<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    let candidate = strip_fence(text);
    serde_json::from_str(candidate.trim())
}

fn strip_fence(text: &str) -> &str {
    // Prefer an explicit ```json block anywhere in the reply.
    let re = Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("valid fence regex");
    if let Some(cap) = re.captures(text) {
        if let Some(inner) = cap.get(1) {
            return inner.as_str();
        }
    }
    // Otherwise strip bare leading/trailing fences.
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```")
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use aidigest_core::RepoAnalysis;

    use super::*;

    const BODY: &str = r#"{"summary":"s","why_trending":"w","key_innovations":["a"],"practical_value":"p","learning_points":["b"]}"#;

    #[test]
    fn parses_bare_json() {
        let parsed: RepoAnalysis = parse_model_json(BODY).unwrap();
        assert_eq!(parsed.summary, "s");
        assert_eq!(parsed.key_innovations, vec!["a"]);
    }

    #[test]
    fn parses_json_fenced_block() {
        let fenced = format!("Here you go:\n```json\n{BODY}\n```\nHope that helps!");
        let parsed: RepoAnalysis = parse_model_json(&fenced).unwrap();
        assert_eq!(parsed.why_trending, "w");
    }

    #[test]
    fn parses_anonymous_fence() {
        let fenced = format!("```\n{BODY}\n```");
        let parsed: RepoAnalysis = parse_model_json(&fenced).unwrap();
        assert_eq!(parsed.practical_value, "p");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let parsed: RepoAnalysis = parse_model_json(r#"{"summary":"only this"}"#).unwrap();
        assert_eq!(parsed.summary, "only this");
        assert!(parsed.learning_points.is_empty());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_model_json::<RepoAnalysis>("sorry, I cannot").is_err());
    }
}
