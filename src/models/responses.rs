//! Response DTOs for the maintenance API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Response body for sweep and clear operations
#[derive(Debug, Clone, Serialize)]
pub struct RemovedResponse {
    /// Human-readable summary
    pub message: String,
    /// Records removed
    pub removed: usize,
}

impl RemovedResponse {
    pub fn new(operation: &str, removed: usize) -> Self {
        Self {
            message: format!("{} removed {} entries", operation, removed),
            removed,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_flattens() {
        let stats = CacheStats {
            total_entries: 3,
            hits: 8,
            misses: 2,
            location: "/tmp/cache".to_string(),
            ..CacheStats::default()
        };
        let json = serde_json::to_value(StatsResponse::from(stats)).unwrap();

        assert_eq!(json["total_entries"], 3);
        assert_eq!(json["location"], "/tmp/cache");
        assert!((json["hit_rate"].as_f64().unwrap() - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_removed_response_serialize() {
        let resp = RemovedResponse::new("Sweep", 4);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"removed\":4"));
        assert!(json.contains("Sweep removed 4 entries"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
