//! Live network client.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::debug;

use crate::models::{AssetRequest, AssetResponse};

/// HTTP request timeout in seconds.
/// 30s allows for slow asset fetches while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// The network side of the agent: one request in, one response out.
///
/// A trait seam so the fetch and install handlers can be exercised against a
/// stub network in tests. A response with an HTTP error status resolves
/// successfully; only transport failures (DNS, connect, timeout) are errors.
#[async_trait]
pub trait NetworkFetch: Send + Sync {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse>;
}

/// Network client for live fetches.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct NetClient {
    client: Client,
}

impl NetClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl NetworkFetch for NetClient {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse> {
        debug!(method = %request.method, url = %request.url, "fetching from network");

        let response = self
            .client
            .request(request.method.clone(), request.url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to send {} request to {}", request.method, request.url))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from {}", request.url))?
            .to_vec();

        Ok(AssetResponse {
            url: request.url.to_string(),
            status,
            content_type,
            body,
        })
    }
}
