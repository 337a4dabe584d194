//! Invalidation Module
//!
//! Deletes cache entries that a data mutation may have made stale.
//!
//! Targeted invalidation is a whitelist: [`EntityKind::dependents`] is the
//! single table listing which keys embed which entity. Anything not listed
//! there is left to expire on its TTL.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::key::{scalar_key, singleton_key, Namespace};
use crate::cache::CacheStore;
use crate::error::CacheError;

// == Entity Kind ==
/// Kinds of mutated entities with known cache dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Product,
    Category,
    Order,
}

/// Cache entries depending on one entity.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Dependents {
    /// Individual keys to delete
    pub keys: Vec<String>,
    /// Whole namespaces to drop
    pub namespaces: Vec<Namespace>,
}

impl EntityKind {
    /// Cache entries that embed data of entity `id`.
    pub fn dependents(&self, id: &str, parent_category: Option<&str>) -> Dependents {
        let parent = parent_category.map(|c| scalar_key(Namespace::Category, c));

        match self {
            EntityKind::Product => Dependents {
                keys: [Some(scalar_key(Namespace::Product, id)), parent]
                    .into_iter()
                    .flatten()
                    .chain([
                        singleton_key(Namespace::Homepage),
                        singleton_key(Namespace::Featured),
                    ])
                    .collect(),
                namespaces: Vec::new(),
            },
            EntityKind::Category => Dependents {
                keys: [Some(scalar_key(Namespace::Category, id)), parent]
                    .into_iter()
                    .flatten()
                    .chain([
                        singleton_key(Namespace::Homepage),
                        singleton_key(Namespace::Navigation),
                    ])
                    .collect(),
                namespaces: Vec::new(),
            },
            EntityKind::Order => Dependents {
                keys: vec![singleton_key(Namespace::Homepage)],
                namespaces: vec![Namespace::Analytics],
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            EntityKind::Category => "category",
            EntityKind::Order => "order",
        }
    }
}

impl FromStr for EntityKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "product" => Ok(EntityKind::Product),
            "category" => Ok(EntityKind::Category),
            "order" => Ok(EntityKind::Order),
            other => Err(CacheError::UnknownEntity(other.to_string())),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Invalidation Report ==
/// What an invalidation touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvalidationReport {
    /// Keys targeted
    pub keys: Vec<String>,
    /// Namespaces dropped
    pub namespaces: Vec<String>,
    /// Records actually removed
    pub removed: usize,
}

// == Invalidation Policy ==
/// Mutation-triggered deletion and maintenance sweeps over a store.
#[derive(Debug, Clone)]
pub struct InvalidationPolicy {
    store: Arc<CacheStore>,
}

impl InvalidationPolicy {
    pub fn new(store: Arc<CacheStore>) -> Self {
        Self { store }
    }

    // == Targeted ==
    /// Deletes every entry known to embed entity `id` of kind `kind`.
    pub fn invalidate(
        &self,
        kind: EntityKind,
        id: &str,
        parent_category: Option<&str>,
    ) -> InvalidationReport {
        let dependents = kind.dependents(id, parent_category);
        let mut report = InvalidationReport::default();

        for key in dependents.keys {
            match self.store.delete(&key) {
                Ok(true) => report.removed += 1,
                Ok(false) => {}
                Err(err) => warn!(key = %key, error = %err, "Failed to invalidate cache entry"),
            }
            report.keys.push(key);
        }

        for namespace in dependents.namespaces {
            report.removed += self.store.delete_namespace(namespace.as_str());
            report.namespaces.push(namespace.to_string());
        }

        info!(
            entity = %kind,
            id,
            removed = report.removed,
            "Invalidated dependent cache entries"
        );
        report
    }

    // == Bulk ==
    /// Deletes every entry in `namespace`, e.g. all cached search results.
    pub fn invalidate_namespace(&self, namespace: &str) -> InvalidationReport {
        let removed = self.store.delete_namespace(namespace);
        info!(namespace, removed, "Invalidated cache namespace");

        InvalidationReport {
            keys: Vec::new(),
            namespaces: vec![namespace.to_string()],
            removed,
        }
    }

    // == Sweep ==
    /// Removes expired and unreadable entries. Returns the number removed.
    pub fn sweep(&self) -> usize {
        let removed = self.store.clean_expired();
        debug!(removed, "Cache sweep finished");
        removed
    }
}
