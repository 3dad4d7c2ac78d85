//! JSON driver backed by [`serde_json`].
//!
//! Files are pretty-printed with 2-space indentation, keys sorted, UTF-8
//! written as-is (no `\u` escaping of non-ASCII text) and a trailing newline.

use crate::error::BoxError;
use crate::traits::Driver;
use crate::value::Collection;

/// JSON format driver. Stores collections as `<collection>.json` under
/// the `json/` subdirectory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonDriver;

impl Driver for JsonDriver {
    const EXTENSION: &'static str = "json";
    const FORMAT_SUBDIR: &'static str = "json";
    const NAME: &'static str = "JSON";

    fn serialize(&self, collection: &Collection) -> Result<Vec<u8>, BoxError> {
        let mut out = serde_json::to_vec_pretty(collection)?;
        out.push(b'\n');
        Ok(out)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Collection, BoxError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
