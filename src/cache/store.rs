//! Cache Store Module
//!
//! Durable cache engine: one JSON record per key under a root directory,
//! grouped into one sub-directory per namespace.
//!
//! Layout: `<root>/<namespace>/<sha256(key)>.json`. Writes go to a temp file
//! in the same directory and are renamed into place, so a reader sees either
//! the old record, the new one, or nothing.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tempfile::Builder;
use tracing::{debug, warn};

use crate::cache::entry::current_timestamp;
use crate::cache::key::{digest, namespace_of};
use crate::cache::{CacheEntry, CacheStats, StatsCounters};
use crate::error::{CacheError, Result};

/// File extension of persisted records
const RECORD_EXTENSION: &str = "json";

/// Name prefix of in-flight write files
const TEMP_PREFIX: &str = ".tmp";

/// Age after which a leftover write file is considered abandoned
const ORPHAN_GRACE: Duration = Duration::from_secs(3600);

/// Record metadata without decoding the payload
type RecordHeader = CacheEntry<IgnoredAny>;

// == Cache Store ==
/// File-backed cache storage with per-entry TTL.
///
/// All operations take `&self`; share it as `Arc<CacheStore>`. Each single
/// operation is atomic at the file level, but nothing spans two operations.
#[derive(Debug)]
pub struct CacheStore {
    /// Root directory of all records
    root: PathBuf,
    /// Activity counters
    counters: StatsCounters,
}

impl CacheStore {
    // == Constructor ==
    /// Opens (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        Ok(Self {
            root,
            counters: StatsCounters::default(),
        })
    }

    /// Root directory of the store.
    pub fn location(&self) -> &Path {
        &self.root
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns `None` when the key is absent, expired, or its record cannot
    /// be decoded as `T`. Expired and undecodable records are deleted.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let Some(path) = self.record_path(key) else {
            self.counters.record_miss();
            return None;
        };

        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    warn!(key, error = %err, "Cache read failed");
                }
                self.counters.record_miss();
                return None;
            }
        };

        match serde_json::from_slice::<CacheEntry<T>>(&raw) {
            Ok(entry) if entry.key != key => {
                debug!(key, stored = %entry.key, "Record belongs to another key");
                self.counters.record_miss();
                None
            }
            Ok(entry) if entry.is_expired() => {
                debug!(key, "Removing expired entry");
                self.remove_record(&path);
                self.counters.record_miss();
                None
            }
            Ok(entry) => {
                self.counters.record_hit();
                Some(entry.data)
            }
            Err(err) => {
                warn!(key, error = %err, "Discarding unreadable cache record");
                self.remove_record(&path);
                self.counters.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores a value under `key` for `ttl_seconds`, replacing any existing entry.
    ///
    /// An error means the value was not cached; callers should carry on
    /// with the value they already hold.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl_seconds: u64) -> Result<()> {
        let result = self.write_record(key, value, ttl_seconds);
        match &result {
            Ok(()) => self.counters.record_write(),
            Err(_) => self.counters.record_write_failure(),
        }
        result
    }

    fn write_record<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> Result<()> {
        let path = self
            .record_path(key)
            .ok_or_else(|| CacheError::InvalidKey("key must not be empty".to_string()))?;
        let bytes = serde_json::to_vec(&CacheEntry::new(key, value, ttl_seconds))?;

        let dir = self.namespace_dir(namespace_of(key));
        fs::create_dir_all(&dir)?;

        let mut tmp = Builder::new().prefix(TEMP_PREFIX).tempfile_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }

    // == Delete ==
    /// Removes an entry by key.
    ///
    /// Returns whether a record was removed; deleting an absent key is not an error.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let Some(path) = self.record_path(key) else {
            return Ok(false);
        };

        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    // == Delete Namespace ==
    /// Removes every entry tagged with `namespace`. Returns the number removed.
    pub fn delete_namespace(&self, namespace: &str) -> usize {
        let mut removed = 0;

        for path in record_files(&self.namespace_dir(namespace)) {
            let matches = match read_header(&path) {
                Ok(Some(header)) => header.namespace == namespace,
                // Unreadable record in this namespace's directory
                Ok(None) => true,
                Err(_) => false,
            };
            if matches && self.remove_record(&path) {
                removed += 1;
            }
        }

        removed
    }

    // == Clear ==
    /// Removes every entry unconditionally. Returns the number of records removed.
    pub fn clear(&self) -> usize {
        let mut removed = 0;

        for dir in self.namespace_dirs() {
            for path in files_in(&dir) {
                let is_record = has_record_extension(&path);
                if self.remove_record(&path) && is_record {
                    removed += 1;
                }
            }
            // A concurrent write may have repopulated it
            let _ = fs::remove_dir(&dir);
        }

        removed
    }

    // == Clean Expired ==
    /// Removes all expired or unreadable entries.
    ///
    /// Also deletes write files left behind by an interrupted `set` once they
    /// are older than [`ORPHAN_GRACE`]. Returns the number of entries removed;
    /// orphaned write files are not counted.
    pub fn clean_expired(&self) -> usize {
        let now = current_timestamp();
        let mut removed = 0;
        let mut orphans = 0;

        for dir in self.namespace_dirs() {
            for path in files_in(&dir) {
                if !has_record_extension(&path) {
                    if is_abandoned_write(&path) && self.remove_record(&path) {
                        orphans += 1;
                    }
                    continue;
                }

                let dead = match read_header(&path) {
                    Ok(Some(header)) => header.is_expired_at(now),
                    Ok(None) => true,
                    Err(_) => false,
                };
                if dead && self.remove_record(&path) {
                    removed += 1;
                }
            }
        }

        if orphans > 0 {
            debug!(orphans, "Removed abandoned write files");
        }
        removed
    }

    // == Stats ==
    /// Returns a snapshot of storage contents and activity counters.
    pub fn stats(&self) -> CacheStats {
        let now = current_timestamp();
        let mut stats = CacheStats {
            location: self.root.display().to_string(),
            ..CacheStats::default()
        };

        for path in self.all_records() {
            let Ok(meta) = fs::metadata(&path) else {
                continue;
            };
            stats.total_entries += 1;
            stats.total_bytes += meta.len();

            match read_header(&path) {
                Ok(Some(header)) if !header.is_expired_at(now) => stats.valid_entries += 1,
                _ => stats.expired_entries += 1,
            }
        }

        self.counters.fill(&mut stats);
        stats
    }

    // == Length ==
    /// Returns the number of records on disk, live or not.
    pub fn len(&self) -> usize {
        self.all_records().len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Paths ==
    fn namespace_dir(&self, namespace: &str) -> PathBuf {
        self.root.join(sanitize_namespace(namespace))
    }

    pub(crate) fn record_path(&self, key: &str) -> Option<PathBuf> {
        if key.is_empty() {
            return None;
        }
        let file = format!("{}.{}", digest(key.as_bytes()), RECORD_EXTENSION);
        Some(self.namespace_dir(namespace_of(key)).join(file))
    }

    fn namespace_dirs(&self) -> Vec<PathBuf> {
        match fs::read_dir(&self.root) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect(),
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    warn!(location = %self.root.display(), error = %err, "Cannot list cache root");
                }
                Vec::new()
            }
        }
    }

    fn all_records(&self) -> Vec<PathBuf> {
        self.namespace_dirs()
            .iter()
            .flat_map(|dir| record_files(dir))
            .collect()
    }

    /// Best-effort removal; true if this call removed the file.
    fn remove_record(&self, path: &Path) -> bool {
        match fs::remove_file(path) {
            Ok(()) => true,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %err, "Failed to remove cache record");
                }
                false
            }
        }
    }
}

// == Helpers ==
/// Maps a namespace to a safe directory name.
fn sanitize_namespace(namespace: &str) -> String {
    let name: String = namespace
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if name.is_empty() {
        "_".to_string()
    } else {
        name
    }
}

fn has_record_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXTENSION)
}

fn files_in(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn record_files(dir: &Path) -> Vec<PathBuf> {
    files_in(dir)
        .into_iter()
        .filter(|p| has_record_extension(p))
        .collect()
}

/// A temp write file that has not been touched within the grace period.
fn is_abandoned_write(path: &Path) -> bool {
    let is_temp = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(TEMP_PREFIX));
    if !is_temp {
        return false;
    }

    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age > ORPHAN_GRACE)
}

/// Reads a record's metadata. `Ok(None)` means the record is unparseable.
fn read_header(path: &Path) -> io::Result<Option<RecordHeader>> {
    let raw = fs::read(path)?;
    Ok(serde_json::from_slice(&raw).ok())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, CacheStore) {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::open(dir.path().join("cache")).unwrap();
        (dir, store)
    }

    /// Writes a record whose expiry lies in the past.
    fn write_expired(store: &CacheStore, key: &str) {
        let mut entry = CacheEntry::new(key, "stale", 60);
        entry.created_at -= 120;
        entry.expires_at = entry.created_at + 1;
        let path = store.record_path(key).unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_vec(&entry).unwrap()).unwrap();
    }

    fn write_raw(store: &CacheStore, key: &str, contents: &str) {
        let path = store.record_path(key).unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_store_open_creates_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nested").join("cache");
        let store = CacheStore::open(&root).unwrap();

        assert!(root.is_dir());
        assert_eq!(store.location(), root.as_path());
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let (_dir, store) = open_store();

        store.set("product:1", &json!({"name": "Boot", "price": 40}), 60).unwrap();
        let value: serde_json::Value = store.get("product:1").unwrap();

        assert_eq!(value["name"], "Boot");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_typed_values() {
        let (_dir, store) = open_store();

        store.set("category:3", &vec![1u32, 2, 3], 60).unwrap();
        store.set("asset:x", "/img/x.webp", 60).unwrap();

        assert_eq!(store.get::<Vec<u32>>("category:3"), Some(vec![1, 2, 3]));
        assert_eq!(store.get::<String>("asset:x").as_deref(), Some("/img/x.webp"));
    }

    #[test]
    fn test_store_get_nonexistent() {
        let (_dir, store) = open_store();
        assert_eq!(store.get::<String>("nonexistent"), None);
        assert_eq!(store.get::<String>(""), None);
    }

    #[test]
    fn test_store_overwrite() {
        let (_dir, store) = open_store();

        store.set("key1", "value1", 60).unwrap();
        store.set("key1", "value2", 60).unwrap();

        assert_eq!(store.get::<String>("key1").as_deref(), Some("value2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_delete_is_idempotent() {
        let (_dir, store) = open_store();

        store.set("key1", "value1", 60).unwrap();
        assert!(store.delete("key1").unwrap());
        assert!(!store.delete("key1").unwrap());
        assert!(!store.delete("never-set").unwrap());

        assert!(store.is_empty());
        assert_eq!(store.get::<String>("key1"), None);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let (_dir, store) = open_store();

        store.set("key1", "value1", 1).unwrap();
        assert!(store.get::<String>("key1").is_some());

        // Whole-second timestamps: wait until strictly past the expiry second
        sleep(Duration::from_millis(2100));

        assert_eq!(store.get::<String>("key1"), None);
        assert_eq!(store.stats().total_entries, 0);
    }

    #[test]
    fn test_expired_record_removed_on_read() {
        let (_dir, store) = open_store();
        write_expired(&store, "product:9");
        assert_eq!(store.len(), 1);

        assert_eq!(store.get::<String>("product:9"), None);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_corrupt_record_self_heals() {
        let (_dir, store) = open_store();
        write_raw(&store, "product:5", "{not json");

        assert_eq!(store.get::<String>("product:5"), None);
        assert!(store.is_empty(), "Corrupt record should be deleted");

        store.set("product:5", "fresh", 60).unwrap();
        assert_eq!(store.get::<String>("product:5").as_deref(), Some("fresh"));
    }

    #[test]
    fn test_type_mismatch_is_a_miss() {
        let (_dir, store) = open_store();
        store.set("k", "text", 60).unwrap();

        assert_eq!(store.get::<Vec<u32>>("k"), None);
        assert_eq!(store.get::<String>("k"), None);
    }

    #[test]
    fn test_set_empty_key_fails() {
        let (_dir, store) = open_store();
        let result = store.set("", "v", 60);

        assert!(matches!(result, Err(CacheError::InvalidKey(_))));
        assert_eq!(store.stats().write_failures, 1);
    }

    #[test]
    fn test_set_fails_when_storage_unwritable() {
        let (_dir, store) = open_store();
        // Block the namespace directory with a plain file
        fs::write(store.location().join("product"), b"").unwrap();

        assert!(store.set("product:1", "v", 60).is_err());
        assert_eq!(store.get::<String>("product:1"), None);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let (_dir, store) = open_store();

        store.set("product:1", "a", 600).unwrap();
        store.set("product:2", "b", 600).unwrap();
        store.set("search:x", "c", 600).unwrap();
        write_expired(&store, "product:3");
        write_expired(&store, "homepage");
        write_raw(&store, "category:4", "garbage");

        assert_eq!(store.clean_expired(), 3);
        assert_eq!(store.len(), 3);
        assert_eq!(store.stats().expired_entries, 0);
        assert_eq!(store.clean_expired(), 0);
    }

    #[test]
    fn test_sweep_reclaims_abandoned_write_files() {
        let (_dir, store) = open_store();
        store.set("product:1", "a", 600).unwrap();

        let dir = store.location().join("product");
        let stale = dir.join(format!("{}stale01", TEMP_PREFIX));
        let fresh = dir.join(format!("{}fresh01", TEMP_PREFIX));
        let foreign = dir.join("README");
        for path in [&stale, &fresh, &foreign] {
            fs::write(path, b"partial").unwrap();
        }
        let old = SystemTime::now() - ORPHAN_GRACE - Duration::from_secs(60);
        fs::File::options()
            .write(true)
            .open(&stale)
            .unwrap()
            .set_modified(old)
            .unwrap();

        assert_eq!(store.clean_expired(), 0);
        assert!(!stale.exists());
        // An in-flight write and unrelated files are left alone
        assert!(fresh.exists());
        assert!(foreign.exists());
        assert_eq!(store.get::<String>("product:1").as_deref(), Some("a"));
    }

    #[test]
    fn test_delete_namespace() {
        let (_dir, store) = open_store();

        store.set("search:a", "1", 600).unwrap();
        store.set("search:b", "2", 600).unwrap();
        store.set("product:7", "p", 600).unwrap();
        store.set("searches:x", "other", 600).unwrap();

        assert_eq!(store.delete_namespace("search"), 2);
        assert_eq!(store.get::<String>("search:a"), None);
        assert_eq!(store.get::<String>("product:7").as_deref(), Some("p"));
        assert_eq!(store.get::<String>("searches:x").as_deref(), Some("other"));
    }

    #[test]
    fn test_delete_namespace_respects_tag_on_sanitized_collision() {
        let (_dir, store) = open_store();

        // "a.b" and "a_b" share a directory name but not a namespace tag
        store.set("a.b:1", "dot", 600).unwrap();
        store.set("a_b:1", "underscore", 600).unwrap();

        assert_eq!(store.delete_namespace("a.b"), 1);
        assert_eq!(store.get::<String>("a_b:1").as_deref(), Some("underscore"));
    }

    #[test]
    fn test_clear() {
        let (_dir, store) = open_store();

        store.set("product:1", "a", 600).unwrap();
        store.set("homepage", "b", 600).unwrap();
        write_raw(&store, "search:z", "garbage");

        assert_eq!(store.clear(), 3);
        assert!(store.is_empty());
        assert!(store.location().is_dir());

        store.set("product:1", "again", 600).unwrap();
        assert_eq!(store.get::<String>("product:1").as_deref(), Some("again"));
    }

    #[test]
    fn test_store_stats() {
        let (_dir, store) = open_store();

        store.set("product:1", "value1", 600).unwrap();
        write_expired(&store, "product:2");
        store.get::<String>("product:1"); // hit
        store.get::<String>("nonexistent"); // miss

        let stats = store.stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.valid_entries, 1);
        assert_eq!(stats.expired_entries, 1);
        assert!(stats.total_bytes > 0);
        assert_eq!(stats.location, store.location().display().to_string());
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.writes, 1);
    }

    #[test]
    fn test_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = CacheStore::open(dir.path()).unwrap();
            store.set("product:1", "persisted", 600).unwrap();
        }
        let store = CacheStore::open(dir.path()).unwrap();
        assert_eq!(store.get::<String>("product:1").as_deref(), Some("persisted"));
    }

    #[test]
    fn test_sanitize_namespace() {
        assert_eq!(sanitize_namespace("product"), "product");
        assert_eq!(sanitize_namespace("../etc"), "___etc");
        assert_eq!(sanitize_namespace(""), "_");
    }
}
