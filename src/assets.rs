//! Fixed install-time asset manifest.
//!
//! The cache name is a static constant; bumping it is the only versioning
//! mechanism this agent has.

/// Name of the single cache instance the agent serves from.
pub const CACHE_NAME: &str = "offcache-assets-v1";

/// Asset paths pre-populated at install time, in population order, resolved
/// against the configured origin.
pub const PRECACHE_ASSETS: &[&str] = &[
    "/",
    "/static/css/style.css",
    "/static/js/app.js",
];
