use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How record keys are compared.
///
/// Applied uniformly by every [`DictStore`](crate::DictStore) operation that
/// takes a key, so a record written under one policy must be read under the
/// same policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyCasing {
    /// Keys are stored and compared exactly as given.
    #[default]
    Preserve,
    /// Keys are lowercased before storage and lookup.
    Lowercase,
}

impl KeyCasing {
    /// Apply the policy to a key.
    pub fn normalize<'a>(&self, key: &'a str) -> std::borrow::Cow<'a, str> {
        match self {
            Self::Preserve => std::borrow::Cow::Borrowed(key),
            Self::Lowercase => std::borrow::Cow::Owned(key.to_lowercase()),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Preserve => "preserve",
            Self::Lowercase => "lowercase",
        }
    }
}

/// What `set` does when the key already holds a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SetMode {
    /// Shallow merge: incoming fields overwrite, other fields are kept.
    #[default]
    Merge,
    /// The incoming record replaces the old one entirely.
    Replace,
}

impl SetMode {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Replace => "replace",
        }
    }
}

/// Error returned when parsing a policy name fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what} '{value}' (expected {expected})")]
pub struct ParsePolicyError {
    what: &'static str,
    value: String,
    expected: &'static str,
}

impl FromStr for KeyCasing {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "preserve" => Ok(Self::Preserve),
            "lowercase" | "lower" => Ok(Self::Lowercase),
            _ => Err(ParsePolicyError {
                what: "key casing",
                value: s.to_string(),
                expected: "preserve|lowercase",
            }),
        }
    }
}

impl FromStr for SetMode {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "merge" => Ok(Self::Merge),
            "replace" => Ok(Self::Replace),
            _ => Err(ParsePolicyError {
                what: "set mode",
                value: s.to_string(),
                expected: "merge|replace",
            }),
        }
    }
}

impl fmt::Display for KeyCasing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration shared by [`DictStore`](crate::DictStore) and
/// [`Catalog`](crate::Catalog).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// The nobox root, i.e. `<appDataRoot>/nobox`. Format subdirectories
    /// live directly beneath it.
    pub root: PathBuf,
    /// Key comparison policy.
    pub key_casing: KeyCasing,
    /// Behaviour of `set` on an existing record.
    pub set_mode: SetMode,
    /// Hold an advisory lock on the database during load-modify-save.
    pub locking: bool,
}

impl StoreConfig {
    /// Default configuration rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            key_casing: KeyCasing::default(),
            set_mode: SetMode::default(),
            locking: true,
        }
    }

    /// Create a builder rooted at `root`.
    pub fn builder(root: impl Into<PathBuf>) -> StoreConfigBuilder {
        StoreConfigBuilder {
            config: Self::new(root),
        }
    }

    /// Directory holding every database of the format with subdirectory
    /// `format_subdir`.
    pub fn format_dir(&self, format_subdir: &str) -> PathBuf {
        self.root.join(format_subdir)
    }

    /// The configured root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Builder for [`StoreConfig`].
#[derive(Debug, Clone)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Set the key comparison policy.
    pub fn key_casing(mut self, casing: KeyCasing) -> Self {
        self.config.key_casing = casing;
        self
    }

    /// Set the `set` policy.
    pub fn set_mode(mut self, mode: SetMode) -> Self {
        self.config.set_mode = mode;
        self
    }

    /// Enable or disable advisory locking.
    pub fn locking(mut self, enabled: bool) -> Self {
        self.config.locking = enabled;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> StoreConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StoreConfig::new("/data/nobox");
        assert_eq!(config.key_casing, KeyCasing::Preserve);
        assert_eq!(config.set_mode, SetMode::Merge);
        assert!(config.locking);
        assert_eq!(config.format_dir("yaml"), PathBuf::from("/data/nobox/yaml"));
    }

    #[test]
    fn builder_overrides() {
        let config = StoreConfig::builder("/r")
            .key_casing(KeyCasing::Lowercase)
            .set_mode(SetMode::Replace)
            .locking(false)
            .build();
        assert_eq!(config.key_casing, KeyCasing::Lowercase);
        assert_eq!(config.set_mode, SetMode::Replace);
        assert!(!config.locking);
    }

    #[test]
    fn parse_policies() {
        assert_eq!("Lowercase".parse::<KeyCasing>().unwrap(), KeyCasing::Lowercase);
        assert_eq!("replace".parse::<SetMode>().unwrap(), SetMode::Replace);

        let err = "upper".parse::<KeyCasing>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown key casing 'upper' (expected preserve|lowercase)"
        );
    }

    #[test]
    fn normalize_keys() {
        assert_eq!(KeyCasing::Preserve.normalize("Alice"), "Alice");
        assert_eq!(KeyCasing::Lowercase.normalize("Alice"), "alice");
    }
}
