//! Shared display helpers.

pub mod format;

pub use format::{format_age, format_size};
