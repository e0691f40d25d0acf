//! Web-search provider client (Serper and SerpApi).
//!
//! Both providers return Google organic results; they are normalized into
//! [`SearchResult`] values carrying title, url, snippet and source domain.
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::StatusCode;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::CommonError;

const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";
const SERPAPI_ENDPOINT: &str = "https://serpapi.com/search";
const RESULTS_PER_QUERY: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchProvider {
    Serper,
    Serpapi,
}

impl SearchProvider {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serper" => Some(Self::Serper),
            "serpapi" => Some(Self::Serpapi),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Serper => "serper",
            Self::Serpapi => "serpapi",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Clone, Debug)]
pub struct WebSearchConfig {
    pub default_provider: SearchProvider,
    pub serper_api_key: Option<String>,
    pub serpapi_api_key: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub max_error_body_bytes: usize,
}

impl WebSearchConfig {
    pub fn from_env() -> Self {
        let default_provider = std::env::var("SEARCH_PROVIDER")
            .ok()
            .and_then(|s| SearchProvider::parse(&s))
            .unwrap_or(SearchProvider::Serper);

        let timeout = std::env::var("SEARCH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(30));

        let max_retries = std::env::var("SEARCH_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0);

        Self {
            default_provider,
            serper_api_key: non_empty_env("SERPER_API_KEY"),
            serpapi_api_key: non_empty_env("SERPAPI_API_KEY"),
            timeout,
            max_retries,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_millis(5_000),
            max_error_body_bytes: 8 * 1024,
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Clone)]
pub struct WebSearchClient {
    config: WebSearchConfig,
    http: reqwest::Client,
}

impl WebSearchClient {
    pub fn new(config: WebSearchConfig) -> Result<Self, CommonError> {
        let http = reqwest::Client::builder()
            .user_agent("flowstacks-directory")
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &WebSearchConfig {
        &self.config
    }

    /// The provider that will serve a request for `requested` (or the
    /// configured default). SerpApi without a key is served by Serper.
    pub fn effective_provider(&self, requested: Option<SearchProvider>) -> SearchProvider {
        match requested.unwrap_or(self.config.default_provider) {
            SearchProvider::Serpapi if self.config.serpapi_api_key.is_none() => SearchProvider::Serper,
            provider => provider,
        }
    }

    /// Run `query` against [`WebSearchClient::effective_provider`].
    pub async fn search(
        &self,
        query: &str,
        provider: Option<SearchProvider>,
    ) -> Result<Vec<SearchResult>, CommonError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CommonError::EmptyQuery);
        }

        let provider = self.effective_provider(provider);
        let results = match provider {
            SearchProvider::Serpapi => self.serpapi_search(query).await,
            SearchProvider::Serper => self.serper_search(query).await,
        }?;

        info!(query, provider = provider.as_str(), results = results.len(), "web search complete");
        Ok(results)
    }

    async fn serper_search(&self, query: &str) -> Result<Vec<SearchResult>, CommonError> {
        let api_key = self
            .config
            .serper_api_key
            .as_deref()
            .ok_or(CommonError::SearchNotConfigured {
                provider: "serper",
                env_var: "SERPER_API_KEY",
            })?;

        let body = serde_json::json!({ "q": query, "num": RESULTS_PER_QUERY });
        let response: SerperResponse = self
            .request_with_retry(|| async {
                let resp = self
                    .http
                    .post(SERPER_ENDPOINT)
                    .timeout(self.config.timeout)
                    .header("X-API-KEY", api_key)
                    .json(&body)
                    .send()
                    .await?;
                self.parse_json_response(resp).await
            })
            .await?;

        Ok(normalize_serper(response))
    }

    async fn serpapi_search(&self, query: &str) -> Result<Vec<SearchResult>, CommonError> {
        let api_key = self
            .config
            .serpapi_api_key
            .as_deref()
            .ok_or(CommonError::SearchNotConfigured {
                provider: "serpapi",
                env_var: "SERPAPI_API_KEY",
            })?;

        let num = RESULTS_PER_QUERY.to_string();
        let response: SerpApiResponse = self
            .request_with_retry(|| async {
                let resp = self
                    .http
                    .get(SERPAPI_ENDPOINT)
                    .timeout(self.config.timeout)
                    .query(&[
                        ("q", query),
                        ("api_key", api_key),
                        ("engine", "google"),
                        ("num", num.as_str()),
                    ])
                    .send()
                    .await?;
                self.parse_json_response(resp).await
            })
            .await?;

        Ok(normalize_serpapi(response))
    }

    async fn parse_json_response<T: for<'de> Deserialize<'de>>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, CommonError> {
        let status = resp.status();
        if status.is_success() {
            let text = resp.text().await?;
            return serde_json::from_str(&text).map_err(CommonError::from);
        }
        let body = read_limited_text(resp, self.config.max_error_body_bytes).await;
        Err(CommonError::SearchUpstream { status, body })
    }

    async fn request_with_retry<T, Fut, F>(&self, mut f: F) -> Result<T, CommonError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, CommonError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match f().await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    if attempt > self.config.max_retries || !should_retry(&e) {
                        return Err(e);
                    }
                    let delay = backoff_delay(
                        self.config.initial_backoff,
                        self.config.max_backoff,
                        attempt - 1,
                    );
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis(),
                        error = %e,
                        "search request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

fn should_retry(err: &CommonError) -> bool {
    match err {
        CommonError::SearchRequest(e) => e.is_timeout() || e.is_connect(),
        CommonError::SearchUpstream { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
        }
        _ => false,
    }
}

fn backoff_delay(initial: Duration, max: Duration, exponent: u32) -> Duration {
    let mult = 1u128.checked_shl(exponent).unwrap_or(u128::MAX);
    let base_ms = initial.as_millis().saturating_mul(mult);
    let capped_ms = std::cmp::min(base_ms, max.as_millis()) as u64;
    let jitter_cap = std::cmp::max(1, capped_ms / 4);
    Duration::from_millis(capped_ms.saturating_add(pseudo_jitter_ms(jitter_cap)))
}

fn pseudo_jitter_ms(max_inclusive: u64) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0));
    (now.subsec_nanos() as u64) % (max_inclusive + 1)
}

async fn read_limited_text(resp: reqwest::Response, max_bytes: usize) -> String {
    match resp.bytes().await {
        Ok(mut b) => {
            if b.len() > max_bytes {
                b.truncate(max_bytes);
            }
            String::from_utf8_lossy(&b).to_string()
        }
        Err(e) => {
            warn!(error = %e, "failed to read provider error body");
            "<failed to read error body>".to_string()
        }
    }
}

/// Host of `url` with a leading `www.` removed. `None` for unparsable input.
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Option<Vec<SerperOrganic>>,
}

#[derive(Debug, Deserialize)]
struct SerperOrganic {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
    description: Option<String>,
    domain: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<SerpApiOrganic>,
}

#[derive(Debug, Deserialize)]
struct SerpApiOrganic {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
    displayed_link: Option<String>,
}

fn normalize_serper(response: SerperResponse) -> Vec<SearchResult> {
    let Some(organic) = response.organic else {
        info!("serper returned no organic results");
        return Vec::new();
    };

    organic
        .into_iter()
        .filter_map(|item| {
            let link = item.link.filter(|l| !l.is_empty())?;
            let title = item.title.filter(|t| !t.is_empty())?;
            let source = item
                .domain
                .filter(|d| !d.is_empty())
                .or_else(|| domain_of(&link))
                .unwrap_or_else(|| link.clone());
            Some(SearchResult {
                title,
                snippet: item.snippet.or(item.description).unwrap_or_default(),
                source: Some(source),
                url: link,
            })
        })
        .collect()
}

fn normalize_serpapi(response: SerpApiResponse) -> Vec<SearchResult> {
    response
        .organic_results
        .into_iter()
        .filter_map(|item| {
            let link = item.link.filter(|l| !l.is_empty())?;
            let source = item.displayed_link.or_else(|| domain_of(&link));
            Some(SearchResult {
                title: item.title.unwrap_or_else(|| "Untitled".to_string()),
                snippet: item.snippet.unwrap_or_default(),
                source,
                url: link,
            })
        })
        .collect()
}
