//! YAML driver backed by [`serde_yaml`].
//!
//! Files use block style with sorted keys and keep unicode unescaped. An
//! explicitly null document (`~` or `null`) reads as an
//! empty collection, the same as an empty file.

use crate::error::BoxError;
use crate::traits::Driver;
use crate::value::Collection;

/// YAML format driver. Stores collections as `<collection>.yaml` under
/// the `yaml/` subdirectory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YamlDriver;

impl Driver for YamlDriver {
    const EXTENSION: &'static str = "yaml";
    const FORMAT_SUBDIR: &'static str = "yaml";
    const NAME: &'static str = "YAML";

    fn serialize(&self, collection: &Collection) -> Result<Vec<u8>, BoxError> {
        Ok(serde_yaml::to_string(collection)?.into_bytes())
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Collection, BoxError> {
        let doc: Option<Collection> = serde_yaml::from_slice(bytes)?;
        Ok(doc.unwrap_or_default())
    }
}
