//! # nobox-store
//!
//! File-backed key-value record store with pluggable serialization formats.
//!
//! A *database* is a directory, a *collection* is one file inside it, and a
//! *record* is a flat map of scalar attributes stored under a key:
//!
//! ```text
//! <root>/
//! └── json/
//!     └── mydb/
//!         └── users.json   {"alice": {"age": 30, "name": "Alice"}}
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use nobox_store::{record, Catalog, JsonDriver, StoreConfig, Value};
//!
//! let root = tempfile::tempdir().unwrap();
//! let catalog = Catalog::new(JsonDriver, StoreConfig::new(root.path()));
//!
//! let mut store = catalog.open("mydb").unwrap();
//! store.set("users", "alice", record([("age", Value::from(30))])).unwrap();
//!
//! assert_eq!(catalog.list_databases().unwrap(), vec!["mydb"]);
//! assert_eq!(store.list_collections().unwrap(), vec!["users"]);
//! ```
//!
//! ## Drivers
//!
//! | Driver | Extension | Subdirectory |
//! |--------|-----------|--------------|
//! | [`JsonDriver`] | `.json` | `json/` |
//! | [`YamlDriver`] | `.yaml` | `yaml/` |

mod catalog;
mod config;
mod error;
mod json;
mod lock;
mod store;
mod traits;
mod value;
mod yaml;

pub use catalog::Catalog;
pub use config::{KeyCasing, ParsePolicyError, SetMode, StoreConfig, StoreConfigBuilder};
pub use error::{BoxError, NameKind, Result, StoreError};
pub use json::JsonDriver;
pub use store::DictStore;
pub use traits::*;
pub use value::{record, Collection, Record, Value};
pub use yaml::YamlDriver;
