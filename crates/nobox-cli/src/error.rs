use std::io;

use nobox_store::StoreError;
use thiserror::Error;

use crate::input::ValidationError;

/// Every way a `nobox` invocation can fail. Each maps to exit status 1.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("record '{0}' not found")]
    RecordNotFound(String),

    #[error("collection '{collection}' not found in database '{db}'")]
    CollectionNotFound { db: String, collection: String },

    #[error("database '{0}' not found")]
    DatabaseNotFound(String),

    #[error("no records imported into {0}")]
    NothingImported(String),

    #[error("unable to determine the application data directory; pass --root or set NOBOX_HOME")]
    NoDataDir,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
