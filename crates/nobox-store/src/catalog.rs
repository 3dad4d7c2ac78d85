//! Database catalog: which databases exist for a format.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::config::StoreConfig;
use crate::error::{NameKind, Result, StoreError};
use crate::store::{validate_segment, DictStore};
use crate::traits::Driver;

/// Enumerates and removes the databases of one format.
///
/// Needs no particular [`DictStore`]; it only looks at
/// `<root>/<D::FORMAT_SUBDIR>`.
#[derive(Debug, Clone)]
pub struct Catalog<D: Driver> {
    driver: D,
    config: StoreConfig,
}

impl<D: Driver + Clone> Catalog<D> {
    /// Create a catalog for `driver` under `config.root`.
    pub fn new(driver: D, config: StoreConfig) -> Self {
        Self { driver, config }
    }

    /// The format directory, `<root>/<D::FORMAT_SUBDIR>`.
    pub fn format_dir(&self) -> PathBuf {
        self.config.format_dir(D::FORMAT_SUBDIR)
    }

    /// Names of all databases of this format, sorted. A missing format
    /// directory means there are none.
    pub fn list_databases(&self) -> Result<Vec<String>> {
        let dir = self.format_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&dir, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&dir, e))?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Whether the database directory exists.
    pub fn database_exists(&self, name: &str) -> Result<bool> {
        validate_segment(NameKind::Database, name)?;
        Ok(self.format_dir().join(name).is_dir())
    }

    /// Open a store for database `name` with this catalog's configuration.
    pub fn open(&self, name: &str) -> Result<DictStore<D>> {
        DictStore::open(name, self.driver.clone(), self.config.clone())
    }

    /// Remove database `name` and every collection in it.
    ///
    /// Returns the number of collections it held, or `None` if it did not
    /// exist.
    pub fn delete_database(&self, name: &str) -> Result<Option<usize>> {
        let store = self.open(name)?;
        if !store.database_exists() {
            return Ok(None);
        }

        let collections = store.list_collections()?.len();
        fs::remove_dir_all(store.path()).map_err(|e| StoreError::io(store.path(), e))?;

        tracing::info!(db = name, collections, "deleted database");
        Ok(Some(collections))
    }
}
