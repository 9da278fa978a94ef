//! Caption retrieval via the public timedtext endpoint.
//!
//! Not every video has captions and the endpoint answers an empty body for
//! those, so every failure here degrades to `None`; the harvester then falls
//! back to description plus top comments.

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

const DEFAULT_TIMEDTEXT_URL: &str = "https://video.google.com/timedtext";

/// Fetches and flattens the English caption track for one video. Returns
/// `None` when no track exists or anything fails along the way.
pub async fn fetch_transcript(
    client: &reqwest::Client,
    base_url: Option<&str>,
    video_id: &str,
) -> Option<String> {
    let base = base_url.unwrap_or(DEFAULT_TIMEDTEXT_URL);
    let response = client
        .get(base)
        .query(&[("lang", "en"), ("v", video_id)])
        .send()
        .await
        .ok()?;
    if !response.status().is_success() {
        tracing::debug!(video = video_id, status = %response.status(), "no timedtext track");
        return None;
    }
    let xml = response.text().await.ok()?;
    parse_timedtext(&xml)
}

/// Flattens a timedtext XML document into one cleaned transcript string.
/// Returns `None` for empty or unparseable documents.
#[must_use]
pub fn parse_timedtext(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut segments: Vec<String> = Vec::new();
    let mut in_text = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"text" => in_text = true,
            Ok(Event::End(e)) if e.name().as_ref() == b"text" => in_text = false,
            Ok(Event::Text(t)) if in_text => {
                if let Ok(decoded) = t.unescape() {
                    let segment = decoded.trim().to_owned();
                    if !segment.is_empty() {
                        segments.push(segment);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!(error = %e, "malformed timedtext document");
                return None;
            }
            _ => {}
        }
    }

    if segments.is_empty() {
        return None;
    }
    let cleaned = clean_transcript(&segments.join(" "));
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Strips sound-effect annotations like `[Music]` and collapses whitespace.
fn clean_transcript(raw: &str) -> String {
    let bracket_re = Regex::new(r"\[[^\]]*\]").expect("valid bracket regex");
    let without_tags = bracket_re.replace_all(raw, " ");
    without_tags.split_whitespace().collect::<Vec<_>>().join(" ")
}
