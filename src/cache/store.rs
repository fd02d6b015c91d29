use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::models::{AssetRequest, AssetResponse};
use crate::net::{FetchError, NetworkFetch};
use crate::utils::format_age;

/// File recording entry URLs in insertion order.
const INDEX_FILE: &str = "index.json";

/// One stored entry: a captured response plus the time it was captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedEntry {
    pub response: AssetResponse,
    pub cached_at: DateTime<Utc>,
}

impl CachedEntry {
    pub fn new(response: AssetResponse) -> Self {
        Self {
            response,
            cached_at: Utc::now(),
        }
    }

    pub fn age_display(&self) -> String {
        format_age(self.cached_at)
    }
}

/// A directory of named caches.
pub struct CacheStorage {
    root: PathBuf,
}

impl CacheStorage {
    pub fn new(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create cache root: {}", root.display()))?;
        Ok(Self { root })
    }

    /// Open the named cache, creating it if absent.
    pub fn open(&self, name: &str) -> Result<AssetCache> {
        let dir = self.root.join(name);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;
        Ok(AssetCache {
            name: name.to_string(),
            dir,
        })
    }

    /// Delete the named cache wholesale. Returns whether it existed.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let dir = self.root.join(name);
        if !dir.exists() {
            return Ok(false);
        }
        std::fs::remove_dir_all(&dir)
            .with_context(|| format!("Failed to remove cache: {}", name))?;
        Ok(true)
    }
}

/// One named cache mapping request URLs to captured responses.
pub struct AssetCache {
    name: String,
    dir: PathBuf,
}

impl AssetCache {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entry file name for a URL. URLs carry characters that are unsafe in
    /// file names, so entries are keyed by the URL's SHA-256 digest.
    fn entry_file_name(url: &str) -> String {
        let digest = Sha256::digest(url.as_bytes());
        format!("{}.json", hex::encode(digest))
    }

    fn entry_path(&self, url: &str) -> PathBuf {
        self.dir.join(Self::entry_file_name(url))
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    fn load_index(&self) -> Result<Vec<String>> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache index for {}", self.name))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache index for {}", self.name))
    }

    fn save_index(&self, urls: &[String]) -> Result<()> {
        let contents = serde_json::to_string_pretty(urls)?;
        std::fs::write(self.index_path(), contents)
            .with_context(|| format!("Failed to write cache index for {}", self.name))
    }

    /// Store one captured response, replacing any previous entry for its URL.
    pub fn put(&self, response: &AssetResponse) -> Result<()> {
        let entry = CachedEntry::new(response.clone());
        let contents = serde_json::to_string_pretty(&entry)?;
        std::fs::write(self.entry_path(&response.url), contents)
            .with_context(|| format!("Failed to write cache entry for {}", response.url))?;

        let mut urls = self.load_index()?;
        if !urls.iter().any(|u| u == &response.url) {
            urls.push(response.url.clone());
            self.save_index(&urls)?;
        }

        debug!(cache = %self.name, url = %response.url, "stored cache entry");
        Ok(())
    }

    /// Look up a stored response matching the request.
    ///
    /// Only GET requests are eligible for matches; anything else is a miss.
    pub fn match_request(&self, request: &AssetRequest) -> Result<Option<CachedEntry>> {
        if request.method != Method::GET {
            return Ok(None);
        }

        let path = self.entry_path(request.url.as_str());
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache entry for {}", request.url))?;
        let entry: CachedEntry = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache entry for {}", request.url))?;

        Ok(Some(entry))
    }

    /// Fetch every request in the list and store the responses.
    ///
    /// Fetches run concurrently; nothing is written until all of them have
    /// completed successfully, and writes happen in list order. A transport
    /// failure or a non-success status on any asset fails the whole
    /// operation.
    pub async fn add_all<N: NetworkFetch>(&self, net: &N, requests: &[AssetRequest]) -> Result<()> {
        info!(cache = %self.name, count = requests.len(), "populating cache");

        let fetches = requests.iter().map(|request| net.fetch(request));
        let responses = future::try_join_all(fetches).await?;

        for response in &responses {
            if !response.is_success() {
                return Err(FetchError::bad_status(&response.url, response.status).into());
            }
        }

        for response in &responses {
            self.put(response)?;
        }

        Ok(())
    }

    /// Entry URLs in insertion order.
    pub fn urls(&self) -> Result<Vec<String>> {
        self.load_index()
    }

    /// Stored entries in insertion order. Unreadable entries are skipped
    /// rather than failing the whole enumeration.
    pub fn entries(&self) -> Result<Vec<CachedEntry>> {
        let mut entries = Vec::new();
        for url in self.load_index()? {
            let request = match url::Url::parse(&url) {
                Ok(parsed) => AssetRequest::get(parsed),
                Err(e) => {
                    debug!(cache = %self.name, url = %url, error = %e, "skipping unparseable index entry");
                    continue;
                }
            };
            match self.match_request(&request) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {
                    debug!(cache = %self.name, url = %url, "index entry has no backing file");
                }
                Err(e) => {
                    debug!(cache = %self.name, url = %url, error = %e, "skipping unreadable cache entry");
                }
            }
        }
        Ok(entries)
    }
}

// ============================================================================
// Tests
// ============================================================================
