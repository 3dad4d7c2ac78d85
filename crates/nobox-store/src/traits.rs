use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Result, StoreError};
use crate::value::Collection;

/// Core trait for collection serialization formats.
///
/// Every format implements this trait. A driver only knows how to turn a
/// [`Collection`] into bytes and back, plus where its files live; it never
/// holds state between calls. Drivers are zero-sized and passed by value
/// into [`DictStore`](crate::DictStore) and [`Catalog`](crate::Catalog),
/// so the format is resolved at compile time.
///
/// Implementors provide `serialize` and `deserialize`. The provided `load`
/// and `save` methods add the filesystem contract shared by all formats:
/// missing and blank files read as empty, saves are atomic.
pub trait Driver {
    /// File extension without the leading dot (e.g. `"json"`).
    const EXTENSION: &'static str;

    /// Storage subdirectory under the nobox root (e.g. `"json"`).
    const FORMAT_SUBDIR: &'static str;

    /// Human-readable format name (e.g. `"JSON"`).
    const NAME: &'static str;

    /// Encode a collection. Output must be deterministic for equal input.
    fn serialize(&self, collection: &Collection) -> std::result::Result<Vec<u8>, crate::BoxError>;

    /// Decode non-blank content into a collection.
    fn deserialize(&self, bytes: &[u8]) -> std::result::Result<Collection, crate::BoxError>;

    /// Load a collection file.
    ///
    /// Returns an empty collection if `path` does not exist or holds only
    /// whitespace. Malformed content fails with [`StoreError::Parse`].
    fn load(&self, path: &Path) -> Result<Collection> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::trace!(path = %path.display(), "collection file absent");
                return Ok(Collection::new());
            }
            Err(e) => return Err(StoreError::io(path, e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Collection::new());
        }

        let collection = self
            .deserialize(&bytes)
            .map_err(|e| StoreError::parse(path, e))?;
        tracing::debug!(
            path = %path.display(),
            records = collection.len(),
            format = Self::NAME,
            "loaded collection"
        );
        Ok(collection)
    }

    /// Save a collection file, replacing any previous content atomically.
    ///
    /// Parent directories are created as needed. The bytes go to a
    /// temporary file in the same directory, which is synced and then
    /// renamed over `path`, so readers see either the old or the new file.
    fn save(&self, path: &Path, collection: &Collection) -> Result<()> {
        let bytes = self
            .serialize(collection)
            .map_err(|e| StoreError::serialize(path, e))?;
        write_atomic(path, &bytes)?;
        tracing::debug!(
            path = %path.display(),
            records = collection.len(),
            bytes = bytes.len(),
            format = Self::NAME,
            "saved collection"
        );
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

    let mut tmp = temp_file_in(dir).map_err(|e| StoreError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| StoreError::io(tmp.path(), e))?;

    // The rename carries the temp file's mode, so hand it the target's.
    match fs::metadata(path) {
        Ok(meta) => tmp
            .as_file()
            .set_permissions(meta.permissions())
            .map_err(|e| StoreError::io(tmp.path(), e))?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(StoreError::io(path, e)),
    }

    tmp.as_file()
        .sync_all()
        .map_err(|e| StoreError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| StoreError::io(path, e.error))?;
    Ok(())
}

/// A temp file in `dir` created with the mode a plain `File::create` would
/// get (0666 less the umask), not tempfile's default 0600.
fn temp_file_in(dir: &Path) -> io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}
