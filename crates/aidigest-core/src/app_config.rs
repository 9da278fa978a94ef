use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub keywords_path: PathBuf,
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_fallback_models: Vec<String>,
    pub github_token: Option<String>,
    pub youtube_api_key: Option<String>,
    pub notify_webhook_url: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub repo_limit: usize,
    pub video_limit: usize,
    pub analysis_max_concurrent: usize,
    pub analysis_max_attempts: u32,
    pub analysis_backoff_base_ms: u64,
    pub request_timeout_secs: u64,
    pub run_timeout_secs: u64,
    pub schedule_cron: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("keywords_path", &self.keywords_path)
            .field("database_url", &"[redacted]")
            .field("llm_api_key", &self.llm_api_key.as_ref().map(|_| "[redacted]"))
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("llm_fallback_models", &self.llm_fallback_models)
            .field("github_token", &self.github_token.as_ref().map(|_| "[redacted]"))
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("notify_webhook_url", &self.notify_webhook_url)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("repo_limit", &self.repo_limit)
            .field("video_limit", &self.video_limit)
            .field("analysis_max_concurrent", &self.analysis_max_concurrent)
            .field("analysis_max_attempts", &self.analysis_max_attempts)
            .field("analysis_backoff_base_ms", &self.analysis_backoff_base_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("run_timeout_secs", &self.run_timeout_secs)
            .field("schedule_cron", &self.schedule_cron)
            .finish()
    }
}
