//! Star-delta extraction from the GitHub trending page.
//!
//! The search API carries no "stars gained today" figure, so the harvester
//! scrapes the public trending page and merges the deltas in by identifier.
//! Any failure here degrades to a delta of zero; it never fails a harvest.

use regex::Regex;

use crate::error::GithubError;

const DEFAULT_TRENDING_URL: &str = "https://github.com/trending?since=daily";

/// One trending entry as scraped from the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendingRepo {
    pub full_name: String,
    pub stars_today: i64,
    pub description: Option<String>,
}

/// Fetches and parses the daily trending page.
///
/// # Errors
///
/// Returns [`GithubError::Http`] on network failure or
/// [`GithubError::UnexpectedStatus`] on a non-2xx response.
pub async fn fetch_trending(
    client: &reqwest::Client,
    base_url: Option<&str>,
) -> Result<Vec<TrendingRepo>, GithubError> {
    let url = base_url.unwrap_or(DEFAULT_TRENDING_URL);
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(GithubError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }
    let html = response.text().await?;
    Ok(parse_trending(&html))
}

/// Extracts `(full_name, stars_today)` pairs from the trending page HTML.
///
/// Each trending entry is an `<article>` whose heading links to
/// `/owner/repo` and whose footer carries an "N stars today" span. Entries
/// that fail to parse are skipped rather than failing the whole page.
#[must_use]
pub fn parse_trending(html: &str) -> Vec<TrendingRepo> {
    let name_re = Regex::new(r#"(?is)<h2[^>]*>.*?href\s*=\s*["']/([^"'/]+/[^"'/?#]+)["']"#)
        .expect("valid trending name regex");
    let stars_re =
        Regex::new(r"(?i)([\d,]+)\s+stars\s+today").expect("valid stars-today regex");
    let desc_re = Regex::new(r"(?is)<p[^>]*>\s*(.*?)\s*</p>").expect("valid description regex");

    html.split("<article")
        .skip(1)
        .filter_map(|block| {
            let full_name = name_re
                .captures(block)
                .and_then(|cap| cap.get(1))
                .map(|m| m.as_str().trim().to_owned())?;
            let stars_today = stars_re
                .captures(block)
                .and_then(|cap| cap.get(1))
                .and_then(|m| m.as_str().replace(',', "").parse::<i64>().ok())
                .unwrap_or(0);
            let description = desc_re
                .captures(block)
                .and_then(|cap| cap.get(1))
                .map(|m| m.as_str().trim().to_owned())
                .filter(|d| !d.is_empty());
            Some(TrendingRepo {
                full_name,
                stars_today,
                description,
            })
        })
        .collect()
}
