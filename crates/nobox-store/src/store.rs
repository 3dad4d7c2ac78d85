//! Collection store: CRUD over one database's collections.
//!
//! # Example
//!
//! ```
//! use nobox_store::{record, DictStore, JsonDriver, StoreConfig, Value};
//!
//! let root = tempfile::tempdir().unwrap();
//! let mut store = DictStore::open("mydb", JsonDriver, StoreConfig::new(root.path())).unwrap();
//!
//! store
//!     .set("users", "alice", record([("name", Value::from("Alice")), ("age", Value::from(30))]))
//!     .unwrap();
//!
//! let alice = store.get("users", "alice").unwrap().unwrap();
//! assert_eq!(alice["age"], Value::Int(30));
//! assert_eq!(store.keys("users").unwrap(), vec!["alice"]);
//! ```

use std::collections::btree_map::Entry;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{SetMode, StoreConfig};
use crate::error::{NameKind, Result, StoreError};
use crate::lock::DbLock;
use crate::traits::Driver;
use crate::value::{Collection, Record};

/// Key-value store over the collections of one database.
///
/// Layout: `<root>/<D::FORMAT_SUBDIR>/<database>/<collection>.<D::EXTENSION>`.
///
/// Nothing is cached. Every call re-reads the collection file, and every
/// mutation writes it back in full, so edits made by other processes between
/// calls are always observed. Mutations take `&mut self` and, with locking
/// enabled, hold the database lock across the whole load-modify-save.
#[derive(Debug, Clone)]
pub struct DictStore<D: Driver> {
    name: String,
    db_dir: PathBuf,
    driver: D,
    config: StoreConfig,
}

impl<D: Driver> DictStore<D> {
    /// Open the database `name`. Nothing is created on disk until the first
    /// write.
    pub fn open(name: &str, driver: D, config: StoreConfig) -> Result<Self> {
        validate_segment(NameKind::Database, name)?;
        let db_dir = config.format_dir(D::FORMAT_SUBDIR).join(name);
        Ok(Self {
            name: name.to_string(),
            db_dir,
            driver,
            config,
        })
    }

    /// The database name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The database directory.
    pub fn path(&self) -> &Path {
        &self.db_dir
    }

    /// The active configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Path of the file backing `collection`.
    pub fn collection_path(&self, collection: &str) -> Result<PathBuf> {
        validate_segment(NameKind::Collection, collection)?;
        Ok(self
            .db_dir
            .join(format!("{collection}.{}", D::EXTENSION)))
    }

    /// Create or update the record at `key`.
    ///
    /// With [`SetMode::Merge`] the fields of `data` are merged into any
    /// existing record; with [`SetMode::Replace`] `data` replaces it.
    pub fn set(&mut self, collection: &str, key: &str, data: Record) -> Result<()> {
        let path = self.collection_path(collection)?;
        let key = self.normalize_key(key)?;

        fs::create_dir_all(&self.db_dir).map_err(|e| StoreError::io(&self.db_dir, e))?;
        let _lock = self.lock()?;

        let mut records = self.driver.load(&path)?;
        match records.entry(key.clone()) {
            Entry::Occupied(mut slot) => match self.config.set_mode {
                SetMode::Merge => slot.get_mut().extend(data),
                SetMode::Replace => {
                    slot.insert(data);
                }
            },
            Entry::Vacant(slot) => {
                slot.insert(data);
            }
        }
        self.driver.save(&path, &records)?;

        tracing::debug!(db = %self.name, collection, key = %key, "set record");
        Ok(())
    }

    /// Get the record at `key`, or `None` if absent.
    pub fn get(&self, collection: &str, key: &str) -> Result<Option<Record>> {
        let key = self.normalize_key(key)?;
        let mut records = self.load(collection)?;
        Ok(records.remove(&key))
    }

    /// Delete the record at `key`. Returns `false`, without writing, if it
    /// was not present.
    pub fn delete(&mut self, collection: &str, key: &str) -> Result<bool> {
        let path = self.collection_path(collection)?;
        let key = self.normalize_key(key)?;

        if !self.db_dir.is_dir() {
            return Ok(false);
        }
        let _lock = self.lock()?;

        let mut records = self.driver.load(&path)?;
        if records.remove(&key).is_none() {
            return Ok(false);
        }
        self.driver.save(&path, &records)?;

        tracing::debug!(db = %self.name, collection, key = %key, "deleted record");
        Ok(true)
    }

    /// All record keys in `collection`, sorted.
    pub fn keys(&self, collection: &str) -> Result<Vec<String>> {
        // Collection is a BTreeMap, so keys come out sorted.
        Ok(self.load(collection)?.into_keys().collect())
    }

    /// Every record in `collection`.
    pub fn all(&self, collection: &str) -> Result<Collection> {
        self.load(collection)
    }

    /// Whether `key` holds a record.
    pub fn exists(&self, collection: &str, key: &str) -> Result<bool> {
        let key = self.normalize_key(key)?;
        Ok(self.load(collection)?.contains_key(&key))
    }

    /// Number of records in `collection`.
    pub fn count(&self, collection: &str) -> Result<usize> {
        Ok(self.load(collection)?.len())
    }

    /// Names of the collections in this database, sorted. A database that
    /// does not exist yet has none.
    pub fn list_collections(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.db_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.db_dir, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.db_dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(D::EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Whether the file for `collection` exists.
    pub fn collection_exists(&self, collection: &str) -> Result<bool> {
        Ok(self.collection_path(collection)?.is_file())
    }

    /// Remove the file for `collection`. Returns `false` if there was none.
    ///
    /// The database directory is left in place even when this was its last
    /// collection.
    pub fn delete_collection(&mut self, collection: &str) -> Result<bool> {
        let path = self.collection_path(collection)?;
        if !self.db_dir.is_dir() {
            return Ok(false);
        }
        let _lock = self.lock()?;

        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(db = %self.name, collection, "deleted collection");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    /// Whether the database directory exists.
    pub fn database_exists(&self) -> bool {
        self.db_dir.is_dir()
    }

    fn load(&self, collection: &str) -> Result<Collection> {
        let path = self.collection_path(collection)?;
        self.driver.load(&path)
    }

    fn normalize_key(&self, key: &str) -> Result<String> {
        if key.is_empty() {
            return Err(StoreError::InvalidName {
                kind: NameKind::Key,
                name: key.to_string(),
            });
        }
        Ok(self.config.key_casing.normalize(key).into_owned())
    }

    fn lock(&self) -> Result<Option<DbLock>> {
        if self.config.locking {
            DbLock::exclusive(&self.db_dir).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Check that `name` is usable as a single path segment.
pub(crate) fn validate_segment(kind: NameKind, name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(StoreError::InvalidName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}
