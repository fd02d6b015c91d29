//! The offline agent: install-time cache population and per-request serving.
//!
//! Two operations, each stateless per invocation:
//!
//! - `install` opens the named cache and seeds it with the fixed asset list.
//! - `handle_fetch` answers one request from the cache when a match exists,
//!   from the live network otherwise. Misses are never written back; this is
//!   a read-only cache-then-network strategy, not cache-aside.

use anyhow::{Context, Result};
use tracing::{debug, info};
use url::Url;

use crate::assets::{CACHE_NAME, PRECACHE_ASSETS};
use crate::cache::{AssetCache, CacheStorage};
use crate::models::{AssetRequest, AssetResponse, ServeSource};
use crate::net::NetworkFetch;

pub struct OfflineAgent<N> {
    cache: AssetCache,
    net: N,
    origin: Url,
}

impl<N: NetworkFetch> OfflineAgent<N> {
    /// Open the named asset cache (creating it if absent) and wire the agent
    /// up to a network facility and the origin asset paths resolve against.
    pub fn new(storage: &CacheStorage, net: N, origin: Url) -> Result<Self> {
        let cache = storage.open(CACHE_NAME)?;
        Ok(Self { cache, net, origin })
    }

    fn precache_requests(&self) -> Result<Vec<AssetRequest>> {
        PRECACHE_ASSETS
            .iter()
            .map(|path| {
                AssetRequest::resolve(&self.origin, path)
                    .with_context(|| format!("Invalid pre-cache asset path: {}", path))
            })
            .collect()
    }

    /// Populate the named cache with the fixed asset list.
    ///
    /// Fails if any asset cannot be fetched and stored; the caller decides
    /// whether to retry or abort.
    pub async fn install(&self) -> Result<()> {
        let requests = self.precache_requests()?;
        self.cache
            .add_all(&self.net, &requests)
            .await
            .context("Install failed: could not populate the asset cache")?;

        info!(cache = CACHE_NAME, assets = requests.len(), "install complete");
        Ok(())
    }

    /// Serve one request: the cached response when a match exists (no network
    /// access), the live network result otherwise.
    pub async fn handle_fetch(
        &self,
        request: &AssetRequest,
    ) -> Result<(AssetResponse, ServeSource)> {
        if let Some(entry) = self.cache.match_request(request)? {
            debug!(url = %request.url, "serving from cache");
            return Ok((entry.response, ServeSource::Cache));
        }

        debug!(url = %request.url, "cache miss, going to network");
        let response = self.net.fetch(request).await?;
        Ok((response, ServeSource::Network))
    }

    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::anyhow;
    use async_trait::async_trait;
    use reqwest::Method;

    use super::*;

    const ORIGIN: &str = "https://tracker.example.com";

    fn origin() -> Url {
        Url::parse(ORIGIN).unwrap()
    }

    fn response(url: &str, body: &[u8]) -> AssetResponse {
        AssetResponse {
            url: url.to_string(),
            status: 200,
            content_type: Some("text/plain".to_string()),
            body: body.to_vec(),
        }
    }

    /// Stub network with a call counter, so tests can assert that cache hits
    /// never touch the network.
    struct CountingNet {
        responses: HashMap<String, AssetResponse>,
        calls: AtomicUsize,
    }

    impl CountingNet {
        fn with(responses: Vec<AssetResponse>) -> Self {
            Self {
                responses: responses.into_iter().map(|r| (r.url.clone(), r)).collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn empty() -> Self {
            Self::with(Vec::new())
        }
    }

    #[async_trait]
    impl NetworkFetch for CountingNet {
        async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .get(request.url.as_str())
                .cloned()
                .ok_or_else(|| anyhow!("connection refused: {}", request.url))
        }
    }

    fn agent_with(
        root: &std::path::Path,
        net: CountingNet,
    ) -> OfflineAgent<CountingNet> {
        let storage = CacheStorage::new(root.to_path_buf()).unwrap();
        OfflineAgent::new(&storage, net, origin()).unwrap()
    }

    fn precache_urls() -> Vec<String> {
        PRECACHE_ASSETS
            .iter()
            .map(|path| origin().join(path).unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_hit_serves_cached_response_without_network() {
        let root = tempfile::tempdir().unwrap();
        let agent = agent_with(root.path(), CountingNet::empty());

        let url = format!("{}/static/js/app.js", ORIGIN);
        let cached = response(&url, b"console.log(1);");
        agent.cache().put(&cached).unwrap();

        let request = AssetRequest::resolve(&origin(), "/static/js/app.js").unwrap();
        let (served, source) = agent.handle_fetch(&request).await.unwrap();

        assert_eq!(served, cached);
        assert_eq!(source, ServeSource::Cache);
        assert_eq!(agent.net.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_miss_returns_exactly_the_network_response() {
        let root = tempfile::tempdir().unwrap();
        let url = format!("{}/api/data", ORIGIN);
        let live = response(&url, b"{\"entries\": []}");
        let agent = agent_with(root.path(), CountingNet::with(vec![live.clone()]));

        let request = AssetRequest::resolve(&origin(), "/api/data").unwrap();
        let (served, source) = agent.handle_fetch(&request).await.unwrap();

        assert_eq!(served, live);
        assert_eq!(source, ServeSource::Network);
        assert_eq!(agent.net.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_miss_is_not_written_back() {
        let root = tempfile::tempdir().unwrap();
        let url = format!("{}/api/data", ORIGIN);
        let agent = agent_with(root.path(), CountingNet::with(vec![response(&url, b"data")]));

        let request = AssetRequest::resolve(&origin(), "/api/data").unwrap();
        agent.handle_fetch(&request).await.unwrap();

        // Still a miss: the second fetch goes to the network again
        agent.handle_fetch(&request).await.unwrap();
        assert_eq!(agent.net.calls.load(Ordering::SeqCst), 2);
        assert!(agent.cache().match_request(&request).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_error_status_from_network_passes_through() {
        let root = tempfile::tempdir().unwrap();
        let url = format!("{}/missing", ORIGIN);
        let mut live = response(&url, b"not found");
        live.status = 404;
        let agent = agent_with(root.path(), CountingNet::with(vec![live]));

        let request = AssetRequest::resolve(&origin(), "/missing").unwrap();
        let (served, source) = agent.handle_fetch(&request).await.unwrap();

        assert_eq!(served.status, 404);
        assert_eq!(source, ServeSource::Network);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates_on_miss() {
        let root = tempfile::tempdir().unwrap();
        let agent = agent_with(root.path(), CountingNet::empty());

        let request = AssetRequest::resolve(&origin(), "/unreachable").unwrap();
        let result = agent.handle_fetch(&request).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_non_get_bypasses_cache() {
        let root = tempfile::tempdir().unwrap();
        let url = format!("{}/form", ORIGIN);
        let agent = agent_with(root.path(), CountingNet::with(vec![response(&url, b"posted")]));
        agent.cache().put(&response(&url, b"stale cached copy")).unwrap();

        let request = AssetRequest::new(Method::POST, Url::parse(&url).unwrap());
        let (served, source) = agent.handle_fetch(&request).await.unwrap();

        assert_eq!(source, ServeSource::Network);
        assert_eq!(served.body, b"posted");
        assert_eq!(agent.net.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_install_populates_asset_list_in_order() {
        let root = tempfile::tempdir().unwrap();
        let responses = precache_urls()
            .iter()
            .map(|url| response(url, b"asset"))
            .collect();
        let agent = agent_with(root.path(), CountingNet::with(responses));

        agent.install().await.unwrap();

        assert_eq!(agent.cache().urls().unwrap(), precache_urls());
    }

    #[tokio::test]
    async fn test_install_fails_when_one_asset_fails() {
        let root = tempfile::tempdir().unwrap();
        // Every asset except the last resolves
        let mut urls = precache_urls();
        urls.pop();
        let responses = urls.iter().map(|url| response(url, b"asset")).collect();
        let agent = agent_with(root.path(), CountingNet::with(responses));

        let result = agent.install().await;
        assert!(result.is_err());
        assert!(agent.cache().urls().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_installed_assets_are_served_offline() {
        let root = tempfile::tempdir().unwrap();
        let responses = precache_urls()
            .iter()
            .map(|url| response(url, b"asset"))
            .collect();
        let agent = agent_with(root.path(), CountingNet::with(responses));
        agent.install().await.unwrap();
        let installs = agent.net.calls.load(Ordering::SeqCst);

        // Every pre-cached asset now serves without touching the network
        for path in PRECACHE_ASSETS {
            let request = AssetRequest::resolve(&origin(), path).unwrap();
            let (_, source) = agent.handle_fetch(&request).await.unwrap();
            assert_eq!(source, ServeSource::Cache);
        }
        assert_eq!(agent.net.calls.load(Ordering::SeqCst), installs);
    }
}
