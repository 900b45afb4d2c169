// The cache knows nothing about writes. Whoever changes posts must call
// `FeedCache::invalidate_all`; otherwise readers see pages up to one TTL old.

use std::time::Duration;

use bytes::Bytes;
use moka::future::Cache;

pub const INDEX_PAGE_PREFIX: &str = "index_page";
pub const DEFAULT_TTL: Duration = Duration::from_secs(20);

#[derive(Clone)]
pub struct FeedCache {
    pages: Cache<String, Bytes>,
}

impl FeedCache {
    pub fn new(ttl: Duration) -> Self {
        let pages = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(ttl)
            .build();
        Self { pages }
    }

    /// Cache key for a global feed request with the given raw query string.
    pub fn key(query: Option<&str>) -> String {
        format!("{INDEX_PAGE_PREFIX}:{}", query.unwrap_or_default())
    }

    pub async fn get(&self, query: Option<&str>) -> Option<Bytes> {
        let key = Self::key(query);
        let hit = self.pages.get(&key).await;
        tracing::debug!(%key, hit = hit.is_some(), "feed cache lookup");
        hit
    }

    pub async fn insert(&self, query: Option<&str>, rendered: Bytes) {
        self.pages.insert(Self::key(query), rendered).await;
    }

    /// Drops every cached page. Call after any write that shows up on the global feed.
    pub fn invalidate_all(&self) {
        tracing::debug!("feed cache invalidated");
        self.pages.invalidate_all();
    }
}

impl Default for FeedCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
