//! Disk-backed cache storage facility.
//!
//! This module provides the named-cache store the agent serves from.
//! `CacheStorage` is a directory of named caches; `AssetCache` is one named
//! cache holding request->response entries, one JSON file per entry, with an
//! ordered index so install order stays observable.
//!
//! A cache, once opened, persists across process invocations. Nothing in this
//! module expires or evicts entries.

pub mod store;

pub use store::{AssetCache, CacheStorage, CachedEntry};
