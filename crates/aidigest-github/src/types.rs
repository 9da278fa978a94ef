//! Wire types for the GitHub search and contents APIs.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchRepo>,
}

/// One repository as returned by `GET /search/repositories`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRepo {
    pub full_name: String,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: i64,
    #[serde(default)]
    pub forks_count: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// One entry of a repository's root listing (`GET /repos/{full}/contents/`).
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub size: i64,
}

/// Readme plus representative source files for one repository. An empty
/// detail block is a valid degraded state (description-only analysis).
#[derive(Debug, Clone, Default)]
pub struct RepoDetail {
    pub readme: String,
    pub code_files: Vec<(String, String)>,
}
