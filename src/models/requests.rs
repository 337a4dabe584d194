//! Request DTOs for the maintenance API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::fmt;

use serde::Deserialize;

/// Entity identifier as sent by mutation paths: numeric or textual.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(u64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{}", n),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

/// Request body for targeted invalidation (POST /invalidate)
///
/// # Fields
/// - `entityType`: `product`, `category` or `order`
/// - `entityId`: id of the mutated entity
/// - `parentCategoryId`: optional category the entity belongs to
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidateRequest {
    pub entity_type: String,
    pub entity_id: EntityId,
    #[serde(default)]
    pub parent_category_id: Option<EntityId>,
}

impl InvalidateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.entity_type.trim().is_empty() {
            return Some("Entity type cannot be empty".to_string());
        }
        if matches!(&self.entity_id, EntityId::Text(s) if s.trim().is_empty()) {
            return Some("Entity id cannot be empty".to_string());
        }
        None
    }
}
