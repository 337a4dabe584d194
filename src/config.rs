//! Configuration Module
//!
//! Handles loading cache location, server settings and per-domain TTLs
//! from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

// == TTL Policy ==
/// Default time-to-live, in seconds, for each kind of cached artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    /// Product detail
    pub product: u64,
    /// Category listing
    pub category: u64,
    /// Search results
    pub search: u64,
    /// Homepage aggregate
    pub homepage: u64,
    /// Analytics rollups
    pub analytics: u64,
    /// Derived/optimized assets (image transforms)
    pub asset: u64,
}

impl TtlPolicy {
    /// Loads each TTL from its `TTL_*` variable, keeping the default when
    /// the variable is missing or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            product: env_or("TTL_PRODUCT", defaults.product),
            category: env_or("TTL_CATEGORY", defaults.category),
            search: env_or("TTL_SEARCH", defaults.search),
            homepage: env_or("TTL_HOMEPAGE", defaults.homepage),
            analytics: env_or("TTL_ANALYTICS", defaults.analytics),
            asset: env_or("TTL_ASSET", defaults.asset),
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            product: 1800,
            category: 900,
            search: 600,
            homepage: 1800,
            analytics: 3600,
            asset: 86400,
        }
    }
}

// == Config ==
/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory holding cache records
    pub cache_dir: PathBuf,
    /// HTTP port for the maintenance API
    pub server_port: u16,
    /// Background sweep interval in seconds
    pub cleanup_interval: u64,
    /// Default TTLs per data kind
    pub ttl: TtlPolicy,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DIR` - Cache root directory (default: ./storage/cache)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 300)
    /// - `TTL_PRODUCT`, `TTL_CATEGORY`, `TTL_SEARCH`, `TTL_HOMEPAGE`,
    ///   `TTL_ANALYTICS`, `TTL_ASSET` - per-domain TTLs in seconds
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_dir: env::var("CACHE_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            ttl: TtlPolicy::from_env(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./storage/cache"),
            server_port: 3000,
            cleanup_interval: 300,
            ttl: TtlPolicy::default(),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
