use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Boxed cause carried by parse and serialize errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What kind of name failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    /// A database (directory) name.
    Database,
    /// A collection (file stem) name.
    Collection,
    /// A record key inside a collection.
    Key,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database => f.write_str("database"),
            Self::Collection => f.write_str("collection"),
            Self::Key => f.write_str("key"),
        }
    }
}

/// Errors returned by drivers, [`DictStore`](crate::DictStore) and
/// [`Catalog`](crate::Catalog).
///
/// Absence is never an error: missing records, collections and databases
/// are reported through `Option` and `bool` results instead.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A collection file exists but its content is malformed for the format.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// The driver could not encode a collection.
    #[error("failed to serialize {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// Filesystem failure (permissions, disk, path errors).
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A database, collection or key name that cannot be used.
    #[error("invalid {kind} name '{name}'")]
    InvalidName { kind: NameKind, name: String },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    pub(crate) fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(path: impl AsRef<Path>, source: impl Into<BoxError>) -> Self {
        Self::Parse {
            path: path.as_ref().to_path_buf(),
            source: source.into(),
        }
    }

    pub(crate) fn serialize(path: impl AsRef<Path>, source: impl Into<BoxError>) -> Self {
        Self::Serialize {
            path: path.as_ref().to_path_buf(),
            source: source.into(),
        }
    }

    /// Check if this is a parse error (malformed collection file).
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Check if this is a filesystem error.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Check if this is a name validation error.
    pub fn is_invalid_name(&self) -> bool {
        matches!(self, Self::InvalidName { .. })
    }
}
