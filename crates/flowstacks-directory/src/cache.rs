/// Redis cache for web-search results.
///
/// Reads return `Option<T>` so a missing or broken Redis just means a miss.
///
/// Key schema:
/// - `fsd:v1:search:{sha256(provider|query)}`: JSON Vec<SearchResult> (TTL 3600s)
use flowstacks_common::redis::RedisCache;
use flowstacks_common::web_search::{SearchProvider, SearchResult};
use sha2::{Digest, Sha256};
use tracing::warn;

const KEY_PREFIX: &str = "fsd:v1:";
const SEARCH_TTL_SECS: u64 = 3600;

#[derive(Clone)]
pub struct SearchCache {
    redis: RedisCache,
}

impl SearchCache {
    pub fn new(redis: RedisCache) -> Self {
        Self { redis }
    }

    pub async fn get_results(&self, provider: SearchProvider, query: &str) -> Option<Vec<SearchResult>> {
        let key = search_key(provider, query);
        let json = self.redis.get(&key).await?;
        serde_json::from_str(&json)
            .inspect_err(|e| warn!(error = %e, key, "cache deserialization failed"))
            .ok()
    }

    pub async fn set_results(&self, provider: SearchProvider, query: &str, results: &[SearchResult]) {
        let key = search_key(provider, query);
        if let Ok(json) = serde_json::to_string(results) {
            self.redis.set_with_ttl(&key, &json, SEARCH_TTL_SECS).await;
        }
    }

    pub async fn invalidate_all(&self) -> bool {
        self.redis.delete_by_prefix(&format!("{KEY_PREFIX}search:")).await
    }
}

/// Queries that differ only in case or surrounding whitespace share a key.
fn search_key(provider: SearchProvider, query: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(provider.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(query.trim().to_lowercase().as_bytes());
    let hash = hasher.finalize();
    format!("{KEY_PREFIX}search:{:x}", hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_normalizes_query() {
        let a = search_key(SearchProvider::Serper, "Best AI Tools ");
        let b = search_key(SearchProvider::Serper, "best ai tools");
        assert_eq!(a, b);
        assert!(a.starts_with("fsd:v1:search:"));
        assert_eq!(a.len(), "fsd:v1:search:".len() + 64);
        assert_ne!(a, search_key(SearchProvider::Serpapi, "best ai tools"));
    }

    #[tokio::test]
    async fn disabled_redis_always_misses() {
        let cache = SearchCache::new(RedisCache::disabled());
        let results = vec![SearchResult {
            title: "t".to_string(),
            url: "https://example.com".to_string(),
            snippet: "s".to_string(),
            source: None,
        }];
        cache.set_results(SearchProvider::Serper, "q", &results).await;
        assert!(cache.get_results(SearchProvider::Serper, "q").await.is_none());
        assert!(!cache.invalidate_all().await);
    }
}
