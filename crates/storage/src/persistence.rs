//! Schema-keyed object persistence
//!
//! This module provides the object store that application models are
//! serialized into and restored from. Every record is written under a schema
//! name (e.g. `"Settings"`) inside a versioned envelope carrying a checksum,
//! so that a damaged record is reported instead of silently loaded.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::kv::{KvError, KvStore};

/// Persistence error types
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Key-value store error
    #[error("Key-value store error: {0}")]
    Kv(#[from] KvError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Corruption detected
    #[error("Corruption detected: {0}")]
    Corruption(String),

    /// Version mismatch
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected version
        expected: u32,
        /// Found version
        found: u32,
    },
}

/// Result type for persistence operations
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Object store keyed by schema name
///
/// `deserialize` returning `Ok(None)` means no record has been written for the
/// schema yet. That is a normal first-run outcome, not an error.
pub trait ObjectStore: Send + Sync {
    /// Write `record` under `schema`, replacing any previous record
    fn serialize(&self, schema: &str, record: &Value) -> Result<()>;

    /// Read the record stored under `schema`, if any
    fn deserialize(&self, schema: &str) -> Result<Option<Value>>;
}

/// Versioned record container
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VersionedRecord {
    /// Version number
    version: u32,
    /// Checksum for corruption detection
    checksum: String,
    /// The record itself
    data: Value,
}

impl VersionedRecord {
    fn new(version: u32, data: Value) -> Result<Self> {
        let checksum = checksum_of(&data)?;
        Ok(Self { version, checksum, data })
    }

    fn verify_checksum(&self) -> Result<()> {
        let computed = checksum_of(&self.data)?;

        if computed != self.checksum {
            return Err(PersistenceError::Corruption(format!(
                "Checksum mismatch: expected {}, got {}",
                self.checksum, computed
            )));
        }

        Ok(())
    }

    /// Validate the envelope and hand back the record
    fn open(self, expected_version: u32) -> Result<Value> {
        self.verify_checksum()?;

        if self.version != expected_version {
            return Err(PersistenceError::VersionMismatch {
                expected: expected_version,
                found: self.version,
            });
        }

        Ok(self.data)
    }
}

fn checksum_of(data: &Value) -> Result<String> {
    let data_json = serde_json::to_string(data)?;
    Ok(format!("{:x}", md5::compute(data_json)))
}

/// Object store backed by the sled key-value store
///
/// Records live under `schema:<name>` keys.
#[derive(Clone)]
pub struct KvObjectStore {
    kv: KvStore,
    version: u32,
}

impl KvObjectStore {
    /// Create an object store over an open key-value store
    pub fn new(kv: KvStore) -> Self {
        Self { kv, version: 1 }
    }

    /// Set the record format version
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Access the underlying key-value store
    pub fn kv(&self) -> &KvStore {
        &self.kv
    }

    fn key(&self, schema: &str) -> Result<String> {
        Ok(self.kv.scoped_key(&["schema", schema])?)
    }
}

impl ObjectStore for KvObjectStore {
    fn serialize(&self, schema: &str, record: &Value) -> Result<()> {
        let key = self.key(schema)?;
        let versioned = VersionedRecord::new(self.version, record.clone())?;
        self.kv.set(&key, &versioned)?;
        self.kv.flush()?;
        tracing::debug!(schema, "record written to key-value store");
        Ok(())
    }

    fn deserialize(&self, schema: &str) -> Result<Option<Value>> {
        let key = self.key(schema)?;
        match self.kv.get::<VersionedRecord>(&key)? {
            Some(versioned) => Ok(Some(versioned.open(self.version)?)),
            None => Ok(None),
        }
    }
}

/// File store configuration
#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    /// Directory holding one `<schema>.json` file per schema
    pub dir: PathBuf,
    /// Current record format version
    pub version: u32,
    /// Enable atomic writes with temp files
    pub atomic_writes: bool,
    /// Enable automatic backups
    pub auto_backup: bool,
    /// Number of backups to keep
    pub backup_count: usize,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            version: 1,
            atomic_writes: true,
            auto_backup: false,
            backup_count: 3,
        }
    }
}

impl FileStoreConfig {
    /// Create a new configuration rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), ..Default::default() }
    }

    /// Set record format version
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Enable or disable atomic writes
    pub fn atomic_writes(mut self, enabled: bool) -> Self {
        self.atomic_writes = enabled;
        self
    }

    /// Configure backups
    pub fn backups(mut self, enabled: bool, count: usize) -> Self {
        self.auto_backup = enabled;
        self.backup_count = count;
        self
    }
}

/// Object store writing one JSON file per schema
#[derive(Debug, Clone)]
pub struct FileObjectStore {
    config: FileStoreConfig,
}

impl FileObjectStore {
    /// Create a file store, creating the directory if needed
    pub fn new(config: FileStoreConfig) -> Result<Self> {
        fs::create_dir_all(&config.dir)?;
        Ok(Self { config })
    }

    /// Path of the file holding `schema`
    pub fn path_for(&self, schema: &str) -> PathBuf {
        self.config.dir.join(format!("{}.json", schema))
    }

    /// Get backup file path
    pub fn backup_path(&self, schema: &str, n: usize) -> PathBuf {
        self.config.dir.join(format!("{}.json.backup.{}", schema, n))
    }

    /// Restore `schema` from a numbered backup
    pub fn restore_from_backup(&self, schema: &str, backup_number: usize) -> Result<()> {
        let backup_path = self.backup_path(schema, backup_number);

        if !backup_path.exists() {
            return Err(PersistenceError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Backup not found",
            )));
        }

        fs::copy(&backup_path, self.path_for(schema))?;
        Ok(())
    }

    /// Write atomically using temp file + rename
    fn write_atomic(&self, path: &Path, contents: &str) -> Result<()> {
        let temp_path = path.with_extension("tmp");

        let mut file = fs::File::create(&temp_path)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Copy the freshly written record into the backup ring
    fn create_backup(&self, schema: &str) -> Result<()> {
        let path = self.path_for(schema);
        if !path.exists() {
            return Ok(());
        }

        for i in (1..self.config.backup_count).rev() {
            let from = self.backup_path(schema, i);
            if from.exists() {
                fs::rename(&from, self.backup_path(schema, i + 1))?;
            }
        }

        fs::copy(&path, self.backup_path(schema, 1))?;
        Ok(())
    }
}

impl ObjectStore for FileObjectStore {
    fn serialize(&self, schema: &str, record: &Value) -> Result<()> {
        let path = self.path_for(schema);
        let versioned = VersionedRecord::new(self.config.version, record.clone())?;
        let json = serde_json::to_string_pretty(&versioned)?;

        if self.config.atomic_writes {
            self.write_atomic(&path, &json)?;
        } else {
            fs::write(&path, json)?;
        }

        if self.config.auto_backup && self.config.backup_count > 0 {
            // The record itself is already on disk at this point.
            if let Err(e) = self.create_backup(schema) {
                tracing::warn!(schema, error = %e, "failed to rotate backups");
            }
        }

        tracing::debug!(schema, path = %path.display(), "record written to file");
        Ok(())
    }

    fn deserialize(&self, schema: &str) -> Result<Option<Value>> {
        let contents = match fs::read_to_string(self.path_for(schema)) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let versioned: VersionedRecord = serde_json::from_str(&contents)?;
        Ok(Some(versioned.open(self.config.version)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> Value {
        json!({ "startMapType": "BingRoad", "startMapZoomLevel": 11 })
    }

    #[test]
    fn test_versioned_record_checksum() {
        let versioned = VersionedRecord::new(1, sample_record()).unwrap();
        assert_eq!(versioned.version, 1);
        versioned.verify_checksum().unwrap();
    }

    #[test]
    fn test_kv_object_store_missing_schema() {
        let store = KvObjectStore::new(KvStore::in_memory().unwrap());
        assert!(store.deserialize("Settings").unwrap().is_none());
    }

    #[test]
    fn test_kv_object_store_round_trip() {
        let store = KvObjectStore::new(KvStore::in_memory().unwrap());

        store.serialize("Settings", &sample_record()).unwrap();
        let raw: Option<Value> = store.kv().get("schema:Settings").unwrap();
        assert_eq!(raw.unwrap()["data"], sample_record());

        let loaded = store.deserialize("Settings").unwrap();
        assert_eq!(loaded, Some(sample_record()));
        assert!(store.deserialize("Other").unwrap().is_none());
    }

    #[test]
    fn test_kv_object_store_overwrites() {
        let store = KvObjectStore::new(KvStore::in_memory().unwrap());

        store.serialize("Settings", &json!({ "startView": "mapView" })).unwrap();
        store.serialize("Settings", &json!({ "startView": "listView" })).unwrap();

        let loaded = store.deserialize("Settings").unwrap().unwrap();
        assert_eq!(loaded, json!({ "startView": "listView" }));
    }

    #[test]
    fn test_kv_object_store_corruption_detection() {
        let store = KvObjectStore::new(KvStore::in_memory().unwrap());

        let tampered = json!({
            "version": 1,
            "checksum": "0000",
            "data": sample_record(),
        });
        store.kv().set("schema:Settings", &tampered).unwrap();

        let result = store.deserialize("Settings");
        assert!(matches!(result, Err(PersistenceError::Corruption(_))));
    }

    #[test]
    fn test_kv_object_store_malformed_payload() {
        let store = KvObjectStore::new(KvStore::in_memory().unwrap());
        store.kv().set_raw("schema:Settings", b"not a record").unwrap();

        let result = store.deserialize("Settings");
        assert!(matches!(result, Err(PersistenceError::Kv(KvError::Serialization(_)))));
    }

    #[test]
    fn test_kv_object_store_version_mismatch() {
        let kv = KvStore::in_memory().unwrap();
        KvObjectStore::new(kv.clone())
            .serialize("Settings", &sample_record())
            .unwrap();

        let result = KvObjectStore::new(kv).version(2).deserialize("Settings");
        assert!(matches!(
            result,
            Err(PersistenceError::VersionMismatch { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn test_kv_object_store_rejects_empty_schema() {
        let store = KvObjectStore::new(KvStore::in_memory().unwrap());
        let result = store.serialize("", &sample_record());
        assert!(matches!(result, Err(PersistenceError::Kv(KvError::InvalidKey(_)))));
    }

    #[test]
    fn test_file_object_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileObjectStore::new(FileStoreConfig::new(dir.path())).unwrap();

        assert!(store.deserialize("Settings").unwrap().is_none());

        store.serialize("Settings", &sample_record()).unwrap();
        assert!(store.path_for("Settings").exists());
        assert!(!store.path_for("Settings").with_extension("tmp").exists());

        // A second handle on the same directory sees the record
        let reopened = FileObjectStore::new(FileStoreConfig::new(dir.path())).unwrap();
        assert_eq!(reopened.deserialize("Settings").unwrap(), Some(sample_record()));
    }

    #[test]
    fn test_file_object_store_corruption_detection() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileObjectStore::new(FileStoreConfig::new(dir.path())).unwrap();
        store.serialize("Settings", &sample_record()).unwrap();

        let path = store.path_for("Settings");
        let contents = fs::read_to_string(&path).unwrap().replace("BingRoad", "BingAerial");
        fs::write(&path, contents).unwrap();

        let result = store.deserialize("Settings");
        assert!(matches!(result, Err(PersistenceError::Corruption(_))));
    }

    #[test]
    fn test_file_object_store_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileObjectStore::new(FileStoreConfig::new(dir.path())).unwrap();
        fs::write(store.path_for("Settings"), "{ truncated").unwrap();

        let result = store.deserialize("Settings");
        assert!(matches!(result, Err(PersistenceError::Serialization(_))));
    }

    #[test]
    fn test_file_object_store_backups() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            FileObjectStore::new(FileStoreConfig::new(dir.path()).backups(true, 2)).unwrap();

        for zoom in 12..=14 {
            store
                .serialize("Settings", &json!({ "startMapZoomLevel": zoom }))
                .unwrap();
        }

        // backup.1 holds the latest write, backup.2 the one before it
        store.restore_from_backup("Settings", 2).unwrap();
        let loaded = store.deserialize("Settings").unwrap().unwrap();
        assert_eq!(loaded["startMapZoomLevel"], 13);

        assert!(store.restore_from_backup("Settings", 3).is_err());
    }
}
