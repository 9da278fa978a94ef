//! Prompt construction with deterministic head-biased truncation.

use crate::types::{RepoPayload, VideoPayload};

pub(crate) const README_MAX_CHARS: usize = 8_000;
pub(crate) const CODE_FILE_MAX_CHARS: usize = 3_000;
pub(crate) const TRANSCRIPT_MAX_CHARS: usize = 15_000;
pub(crate) const DESCRIPTION_MAX_CHARS: usize = 3_000;
const MAX_CODE_FILES: usize = 3;
const MAX_COMMENTS: usize = 5;

/// Keeps the first `max` characters of `text`, marking the cut with an
/// ellipsis. Head-biased: oversized inputs are trimmed, never rejected.
#[must_use]
pub fn truncate_head(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push('…');
    out
}

pub(crate) fn build_repo_prompt(payload: &RepoPayload) -> String {
    let mut code_section = String::new();
    for (name, content) in payload.code_files.iter().take(MAX_CODE_FILES) {
        code_section.push_str(&format!(
            "\n--- {name} ---\n{}\n",
            truncate_head(content, CODE_FILE_MAX_CHARS)
        ));
    }
    if !code_section.is_empty() {
        code_section = format!("\n\nRepresentative source files:\n{code_section}");
    }

    let description = if payload.description.is_empty() {
        "(no description)"
    } else {
        &payload.description
    };

    format!(
        "You are a senior AI engineer reviewing a trending open-source project. \
         Analyze it and reply with a single JSON object.\n\n\
         Repository: {full_name}\n\
         Description: {description}\n\
         Primary language: {language}\n\
         Stars: {stars}\n\n\
         README:\n{readme}{code_section}\n\n\
         Reply with JSON exactly matching this shape:\n\
         {{\n\
           \"summary\": \"core purpose in under 100 words\",\n\
           \"why_trending\": \"why this project is taking off, under 100 words\",\n\
           \"key_innovations\": [\"innovation 1\", \"innovation 2\", \"innovation 3\"],\n\
           \"practical_value\": \"value for practitioners, under 100 words\",\n\
           \"learning_points\": [\"takeaway 1\", \"takeaway 2\", \"takeaway 3\"]\n\
         }}",
        full_name = payload.full_name,
        language = payload.language,
        stars = payload.stars,
        readme = truncate_head(&payload.readme, README_MAX_CHARS),
    )
}

pub(crate) fn build_video_prompt(payload: &VideoPayload) -> String {
    let content_section = match &payload.transcript {
        Some(transcript) if !transcript.is_empty() => format!(
            "Transcript:\n{}",
            truncate_head(transcript, TRANSCRIPT_MAX_CHARS)
        ),
        _ => {
            let mut section = format!(
                "No transcript is available. Description:\n{}\n",
                truncate_head(&payload.description, DESCRIPTION_MAX_CHARS)
            );
            if !payload.top_comments.is_empty() {
                section.push_str("\nTop comments:\n");
                for comment in payload.top_comments.iter().take(MAX_COMMENTS) {
                    section.push_str(&format!("- {}\n", truncate_head(comment, 500)));
                }
            }
            section.push_str("\n(Base the analysis on the title, description, and comments.)");
            section
        }
    };

    format!(
        "You are an AI-focused content analyst reviewing a trending video. \
         Analyze it and reply with a single JSON object.\n\n\
         Title: {title}\n\
         Channel: {channel}\n\
         Views: {views}\n\
         Duration: {duration}\n\n\
         {content_section}\n\n\
         Reply with JSON exactly matching this shape:\n\
         {{\n\
           \"content_summary\": \"core content in under 150 words\",\n\
           \"key_points\": [\"point 1\", \"point 2\", \"point 3\", \"point 4\", \"point 5\"],\n\
           \"why_popular\": \"why this video resonates, under 100 words\",\n\
           \"practical_takeaways\": \"what viewers gain, under 100 words\",\n\
           \"recommended_for\": \"intended audience, under 50 words\"\n\
         }}",
        title = payload.title,
        channel = payload.channel,
        views = payload.view_count,
        duration = payload.duration,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_head_keeps_short_text_intact() {
        assert_eq!(truncate_head("hello", 10), "hello");
    }

    #[test]
    fn truncate_head_trims_long_text() {
        let long = "a".repeat(50);
        let out = truncate_head(&long, 10);
        assert_eq!(out.chars().count(), 11); // 10 kept + ellipsis
        assert!(out.ends_with('…'));
    }

    #[test]
    fn truncate_head_respects_multibyte_boundaries() {
        let text = "héllo wörld ünïcode".repeat(100);
        let out = truncate_head(&text, 20);
        assert_eq!(out.chars().count(), 21);
    }

    #[test]
    fn repo_prompt_truncates_readme() {
        let payload = RepoPayload {
            full_name: "acme/agent".to_owned(),
            readme: "x".repeat(README_MAX_CHARS + 500),
            ..RepoPayload::default()
        };
        let prompt = build_repo_prompt(&payload);
        assert!(prompt.contains("acme/agent"));
        assert!(prompt.chars().count() < README_MAX_CHARS + 2_000);
    }

    #[test]
    fn repo_prompt_limits_code_files_to_three() {
        let payload = RepoPayload {
            full_name: "acme/agent".to_owned(),
            code_files: (0..5)
                .map(|i| (format!("file{i}.rs"), "fn main() {}".to_owned()))
                .collect(),
            ..RepoPayload::default()
        };
        let prompt = build_repo_prompt(&payload);
        assert!(prompt.contains("file2.rs"));
        assert!(!prompt.contains("file3.rs"));
    }

    #[test]
    fn video_prompt_uses_transcript_when_present() {
        let payload = VideoPayload {
            title: "Agents explained".to_owned(),
            transcript: Some("welcome to the channel".to_owned()),
            description: "should not appear".to_owned(),
            ..VideoPayload::default()
        };
        let prompt = build_video_prompt(&payload);
        assert!(prompt.contains("welcome to the channel"));
        assert!(!prompt.contains("should not appear"));
    }

    #[test]
    fn video_prompt_falls_back_to_description_and_comments() {
        let payload = VideoPayload {
            title: "Agents explained".to_owned(),
            description: "a description".to_owned(),
            top_comments: (0..7).map(|i| format!("comment {i}")).collect(),
            ..VideoPayload::default()
        };
        let prompt = build_video_prompt(&payload);
        assert!(prompt.contains("No transcript is available"));
        assert!(prompt.contains("a description"));
        assert!(prompt.contains("comment 4"));
        assert!(!prompt.contains("comment 5"), "top comments capped at 5");
    }
}
