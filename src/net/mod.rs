//! Network facility for live asset fetches.
//!
//! This module provides the `NetworkFetch` trait the agent is generic over
//! and `NetClient`, its `reqwest`-backed implementation. A response with an
//! HTTP error status is still a response; only transport-level failures
//! (DNS, connect, timeout) surface as `FetchError`.

pub mod client;
pub mod error;

pub use client::{NetClient, NetworkFetch};
pub use error::FetchError;
