use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::Url;

/// One intercepted request.
///
/// Requests are not persisted; cache entries are keyed by the request URL.
#[derive(Debug, Clone)]
pub struct AssetRequest {
    pub method: Method,
    pub url: Url,
}

impl AssetRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Build a GET request from a target that is either an absolute URL or a
    /// path resolved against the configured origin.
    pub fn resolve(origin: &Url, target: &str) -> Result<Self, url::ParseError> {
        let url = match Url::parse(target) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => origin.join(target)?,
            Err(e) => return Err(e),
        };
        Ok(Self::get(url))
    }
}

/// One response as captured in the cache or returned from the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetResponse {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    #[serde(with = "body_encoding")]
    pub body: Vec<u8>,
}

impl AssetResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeSource {
    Cache,
    Network,
}

impl ServeSource {
    pub fn label(&self) -> &'static str {
        match self {
            ServeSource::Cache => "cache",
            ServeSource::Network => "network",
        }
    }
}

/// Response bodies are arbitrary bytes (images, fonts) but entries are stored
/// as JSON, so bodies travel base64-encoded.
mod body_encoding {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://tracker.example.com").unwrap()
    }

    #[test]
    fn test_resolve_relative_path() {
        let req = AssetRequest::resolve(&origin(), "/static/css/style.css").unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(
            req.url.as_str(),
            "https://tracker.example.com/static/css/style.css"
        );
    }

    #[test]
    fn test_resolve_root_path() {
        let req = AssetRequest::resolve(&origin(), "/").unwrap();
        assert_eq!(req.url.as_str(), "https://tracker.example.com/");
    }

    #[test]
    fn test_resolve_absolute_url_ignores_origin() {
        let req = AssetRequest::resolve(&origin(), "https://cdn.example.com/app.js").unwrap();
        assert_eq!(req.url.as_str(), "https://cdn.example.com/app.js");
    }

    #[test]
    fn test_response_body_round_trips_through_json() {
        // Non-UTF8 bytes must survive the JSON encoding
        let response = AssetResponse {
            url: "https://tracker.example.com/icon.png".to_string(),
            status: 200,
            content_type: Some("image/png".to_string()),
            body: vec![0x89, 0x50, 0x4e, 0x47, 0x00, 0xff],
        };

        let json = serde_json::to_string(&response).unwrap();
        let parsed: AssetResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, response);
    }

    #[test]
    fn test_is_success_bounds() {
        let mut response = AssetResponse {
            url: "https://tracker.example.com/".to_string(),
            status: 200,
            content_type: None,
            body: Vec::new(),
        };
        assert!(response.is_success());

        response.status = 299;
        assert!(response.is_success());

        response.status = 304;
        assert!(!response.is_success());

        response.status = 404;
        assert!(!response.is_success());
    }
}
