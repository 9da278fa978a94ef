//! HTTP client for the GitHub REST API.
//!
//! Wraps `reqwest` with GitHub-specific error handling and typed response
//! deserialization. The token is optional: unauthenticated requests work
//! against tighter rate limits, matching the API's own contract.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};

use crate::error::GithubError;
use crate::types::{ContentEntry, RepoDetail, SearchRepo, SearchResponse};

const DEFAULT_API_URL: &str = "https://api.github.com";

/// Root-listing file names treated as representative entry points, in
/// priority order.
const ENTRY_POINT_NAMES: &[&str] = &[
    "main.py", "app.py", "run.py", "index.py", "agent.py", "main.ts", "index.ts", "app.ts",
    "main.js", "index.js", "app.js", "main.rs", "lib.rs", "main.go",
];

const MAX_CODE_FILES: usize = 3;

/// Client for the GitHub REST API.
///
/// Use [`GithubClient::new`] for production or [`GithubClient::with_base_url`]
/// to point at a mock server in tests.
pub struct GithubClient {
    client: Client,
    token: Option<String>,
    base_url: String,
}

impl GithubClient {
    /// Creates a new client pointed at the production GitHub API.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(token: Option<&str>, timeout_secs: u64) -> Result<Self, GithubError> {
        Self::with_base_url(token, timeout_secs, DEFAULT_API_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        token: Option<&str>,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GithubError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("aidigest/0.1 (trending-digest)")
            .build()?;
        Ok(Self {
            client,
            token: token.map(str::to_owned),
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// The underlying HTTP client, shared with the trending-page fetch.
    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// Searches repositories for one keyword, most-starred first, restricted
    /// to repositories pushed on or after `pushed_since` (YYYY-MM-DD).
    ///
    /// # Errors
    ///
    /// - [`GithubError::RateLimited`] on 403/429.
    /// - [`GithubError::UnexpectedStatus`] on other non-2xx statuses.
    /// - [`GithubError::Http`] on network failure.
    /// - [`GithubError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn search_repositories(
        &self,
        keyword: &str,
        pushed_since: &str,
        per_page: u32,
    ) -> Result<Vec<SearchRepo>, GithubError> {
        let url = format!("{}/search/repositories", self.base_url);
        let query = format!("\"{keyword}\" pushed:>={pushed_since}");
        let request = self
            .client
            .get(&url)
            .query(&[
                ("q", query.as_str()),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", &per_page.to_string()),
            ])
            .header(ACCEPT, "application/vnd.github+json");

        let body = self.send_checked(request, &url).await?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| GithubError::Deserialize {
                context: format!("search(q={keyword})"),
                source: e,
            })?;
        Ok(parsed.items)
    }

    /// Fetches a single repository's metadata, used to hydrate trending
    /// candidates that did not come through the search API.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::search_repositories`].
    pub async fn get_repo(&self, full_name: &str) -> Result<SearchRepo, GithubError> {
        let url = format!("{}/repos/{full_name}", self.base_url);
        let request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json");
        let body = self.send_checked(request, &url).await?;
        serde_json::from_str(&body).map_err(|e| GithubError::Deserialize {
            context: format!("repo({full_name})"),
            source: e,
        })
    }

    /// Fetches readme plus up to three representative entry-point source
    /// files for a repository. Any individual fetch failure degrades to an
    /// empty field; callers always get a usable (possibly empty) detail.
    pub async fn fetch_repo_detail(&self, full_name: &str) -> RepoDetail {
        let mut detail = RepoDetail::default();

        match self.get_readme(full_name).await {
            Ok(readme) => detail.readme = readme,
            Err(e) => {
                tracing::warn!(repo = full_name, error = %e, "readme fetch failed; degrading");
            }
        }

        let entries = match self.list_root_contents(full_name).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(repo = full_name, error = %e, "root listing failed; degrading");
                return detail;
            }
        };

        for entry in pick_entry_points(&entries) {
            match self.get_raw_file(full_name, &entry.path).await {
                Ok(content) => detail.code_files.push((entry.name.clone(), content)),
                Err(e) => {
                    tracing::warn!(repo = full_name, file = %entry.path, error = %e, "file fetch failed");
                }
            }
        }

        detail
    }

    /// Fetches the repository readme as raw text.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::search_repositories`].
    pub async fn get_readme(&self, full_name: &str) -> Result<String, GithubError> {
        let url = format!("{}/repos/{full_name}/readme", self.base_url);
        let request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github.raw+json");
        self.send_checked(request, &url).await
    }

    /// Lists the repository root directory.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::search_repositories`].
    pub async fn list_root_contents(
        &self,
        full_name: &str,
    ) -> Result<Vec<ContentEntry>, GithubError> {
        let url = format!("{}/repos/{full_name}/contents/", self.base_url);
        let request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json");
        let body = self.send_checked(request, &url).await?;
        serde_json::from_str(&body).map_err(|e| GithubError::Deserialize {
            context: format!("contents({full_name})"),
            source: e,
        })
    }

    /// Fetches one file's raw contents by path.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::search_repositories`].
    pub async fn get_raw_file(&self, full_name: &str, path: &str) -> Result<String, GithubError> {
        let url = format!("{}/repos/{full_name}/contents/{path}", self.base_url);
        let request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github.raw+json");
        self.send_checked(request, &url).await
    }

    /// Sends a request with optional bearer auth, maps non-2xx statuses into
    /// the error taxonomy, and returns the body text.
    async fn send_checked(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<String, GithubError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GithubError::RateLimited {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(GithubError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }
        Ok(response.text().await?)
    }
}

/// Picks up to three entry-point files from a root listing, in the priority
/// order of [`ENTRY_POINT_NAMES`].
fn pick_entry_points(entries: &[ContentEntry]) -> Vec<&ContentEntry> {
    let mut picked: Vec<&ContentEntry> = Vec::new();
    for name in ENTRY_POINT_NAMES {
        if picked.len() >= MAX_CODE_FILES {
            break;
        }
        if let Some(entry) = entries
            .iter()
            .find(|e| e.kind == "file" && e.name.eq_ignore_ascii_case(name))
        {
            picked.push(entry);
        }
    }
    picked
}
