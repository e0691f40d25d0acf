//! Web discovery: provider search with a Redis result cache, and the
//! in-memory article cache that `get_article` reads from.
use std::collections::HashMap;

use flowstacks_common::web_search::{SearchProvider, SearchResult, WebSearchClient};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::cache::SearchCache;
use crate::error::AppError;
use crate::model::Article;

pub const MAX_CACHED_ARTICLES: usize = 50;

/// Stable id derived from the article URL.
pub fn article_id(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let hex = format!("{digest:x}");
    format!("article_{}", &hex[..16])
}

#[derive(Debug, Clone)]
pub struct CachedArticle {
    pub id: String,
    pub article: Article,
    seq: u64,
}

/// Bounded store of recently discovered articles. When full, the entry
/// added longest ago is evicted.
#[derive(Debug, Default)]
pub struct ArticleCache {
    entries: HashMap<String, CachedArticle>,
    current: Option<String>,
    next_seq: u64,
}

impl ArticleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh `article` and return its id.
    pub fn add(&mut self, article: Article) -> String {
        let id = article_id(&article.url);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            id.clone(),
            CachedArticle {
                id: id.clone(),
                article,
                seq,
            },
        );

        if self.entries.len() > MAX_CACHED_ARTICLES {
            if let Some(oldest) = self
                .entries
                .values()
                .min_by_key(|e| e.seq)
                .map(|e| e.id.clone())
            {
                self.entries.remove(&oldest);
                if self.current.as_deref() == Some(oldest.as_str()) {
                    self.current = None;
                }
            }
        }
        id
    }

    pub fn get(&self, id: &str) -> Option<&CachedArticle> {
        self.entries.get(id)
    }

    /// Mark `id` as the article being read; unknown ids leave the pointer unchanged.
    pub fn set_current(&mut self, id: &str) -> bool {
        if self.entries.contains_key(id) {
            self.current = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<&CachedArticle> {
        self.current.as_deref().and_then(|id| self.entries.get(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub provider: SearchProvider,
    pub cached: bool,
    pub results: Vec<SearchResult>,
}

/// Provider search fronted by the Redis result cache.
pub struct DiscoveryService {
    client: WebSearchClient,
    cache: SearchCache,
}

impl DiscoveryService {
    pub fn new(client: WebSearchClient, cache: SearchCache) -> Self {
        Self { client, cache }
    }

    /// Provider that serves requests made without an explicit choice.
    pub fn default_provider(&self) -> SearchProvider {
        self.client.effective_provider(None)
    }

    pub async fn search(&self, query: &str, provider: Option<SearchProvider>) -> Result<SearchOutcome, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Invalid("query must not be empty".to_string()));
        }
        let provider = self.client.effective_provider(provider);

        if let Some(results) = self.cache.get_results(provider, query).await {
            info!(query, provider = provider.as_str(), count = results.len(), "search cache hit");
            return Ok(SearchOutcome {
                provider,
                cached: true,
                results,
            });
        }

        let results = self.client.search(query, Some(provider)).await?;
        self.cache.set_results(provider, query, &results).await;
        Ok(SearchOutcome {
            provider,
            cached: false,
            results,
        })
    }
}
