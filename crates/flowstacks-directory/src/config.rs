use std::path::{Path, PathBuf};

use flowstacks_common::web_search::WebSearchConfig;

use crate::error::AppError;

pub const TOOLS_FILE: &str = "tools.json";
pub const COLLECTIONS_FILE: &str = "collections.json";

/// Application configuration loaded explicitly from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection URL (e.g. "redis://127.0.0.1:6379"). `None` disables
    /// persisted reviews, saved stacks and the search cache.
    pub redis_url: Option<String>,
    /// Directory holding `tools.json` and, optionally, `collections.json`.
    pub data_dir: String,
    /// JSON array of seed reviews merged into every leaderboard computation.
    pub reviews_seed: Option<String>,
    /// Drop cached search results at startup.
    pub clear_search_cache: bool,
    pub search: WebSearchConfig,
}

impl Config {
    /// Required:
    /// - `FLOWSTACKS_DATA_DIR`: directory containing `tools.json`
    ///
    /// Optional:
    /// - `REDIS_URL`
    /// - `FLOWSTACKS_REVIEWS_SEED`: path to a seed reviews file
    /// - `FLOWSTACKS_CLEAR_SEARCH_CACHE`: "1" or "true" to drop cached searches
    /// - `SEARCH_PROVIDER`, `SERPER_API_KEY`, `SERPAPI_API_KEY`,
    ///   `SEARCH_TIMEOUT_SECS`, `SEARCH_MAX_RETRIES`
    pub fn from_env() -> Result<Self, AppError> {
        let data_dir = std::env::var("FLOWSTACKS_DATA_DIR").map_err(|_| {
            AppError::Config("FLOWSTACKS_DATA_DIR environment variable is required".to_string())
        })?;

        let tools_file = Path::new(&data_dir).join(TOOLS_FILE);
        if !tools_file.exists() {
            return Err(AppError::Config(format!(
                "required file not found: {}",
                tools_file.display()
            )));
        }

        let reviews_seed = std::env::var("FLOWSTACKS_REVIEWS_SEED")
            .ok()
            .filter(|p| !p.trim().is_empty());
        if let Some(seed) = reviews_seed.as_deref() {
            if !Path::new(seed).exists() {
                return Err(AppError::Config(format!("reviews seed not found: {seed}")));
            }
        }

        Ok(Self {
            redis_url: std::env::var("REDIS_URL").ok(),
            data_dir,
            reviews_seed,
            clear_search_cache: std::env::var("FLOWSTACKS_CLEAR_SEARCH_CACHE")
                .is_ok_and(|v| matches!(v.trim(), "1" | "true")),
            search: WebSearchConfig::from_env(),
        })
    }

    pub fn tools_file_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(TOOLS_FILE)
    }

    pub fn collections_file_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(COLLECTIONS_FILE)
    }
}
