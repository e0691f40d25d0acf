/// Error types shared across FlowStacks crates.
///
/// These cover infrastructure collaborators (Redis, the web-search provider).
/// Application-specific errors live in each binary crate and wrap
/// `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("redis is not configured")]
    RedisUnavailable,

    #[error("{provider} is not configured: set {env_var}")]
    SearchNotConfigured {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("search query cannot be empty")]
    EmptyQuery,

    #[error("search request failed: {0}")]
    SearchRequest(#[from] reqwest::Error),

    #[error("search provider returned error: status={status} body={body}")]
    SearchUpstream {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid JSON from search provider: {0}")]
    SearchJson(#[from] serde_json::Error),
}

impl CommonError {
    /// True when the failure is a missing provider key rather than a transport error.
    pub fn is_not_configured(&self) -> bool {
        matches!(self, CommonError::SearchNotConfigured { .. })
    }
}
