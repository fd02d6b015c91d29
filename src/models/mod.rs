//! Data models for intercepted requests and captured responses.
//!
//! This module contains the types that flow through the agent:
//!
//! - `AssetRequest`: one intercepted request (method + resolved URL)
//! - `AssetResponse`: one response, either captured in the cache or
//!   fetched live from the network
//! - `ServeSource`: where a served response came from

pub mod asset;

pub use asset::{AssetRequest, AssetResponse, ServeSource};
