//! Domain Module
//!
//! Storefront-facing entry points over the cache.

mod content;

pub use content::ContentCache;
