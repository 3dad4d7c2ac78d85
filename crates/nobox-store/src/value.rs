//! Record model: scalar values, records and collections.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A record: attribute name to scalar value.
///
/// `BTreeMap` keeps attributes sorted, which the drivers rely on for
/// deterministic output.
pub type Record = BTreeMap<String, Value>;

/// A collection: record key to record, sorted by key.
pub type Collection = BTreeMap<String, Record>;

/// A scalar attribute value.
///
/// Deserialization tries the variants in declaration order, so `30` becomes
/// [`Value::Int`], `3.5` becomes [`Value::Float`] and `"30"` (a quoted
/// string) stays [`Value::Str`]. Integers above `i64::MAX` land in
/// [`Value::UInt`] so they are written back exactly.
///
/// Records are flat: there is no variant for `null`, lists or nested
/// mappings. A collection file holding any of those anywhere fails to load
/// with [`StoreError::Parse`](crate::StoreError::Parse) ("data did not
/// match any variant of untagged enum Value") rather than dropping data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean. Only arrives from JSON input, never from `field:value` text.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer too large for `i64`.
    UInt(u64),
    /// Floating-point number.
    Float(f64),
    /// Anything else.
    Str(String),
}

impl Value {
    /// Infer a typed value from command-line text.
    ///
    /// Integers (signed, then unsigned) win over floats; finite floats win
    /// over strings. Spellings such as `inf` or `NaN` stay strings since JSON
    /// cannot represent them.
    ///
    /// ```
    /// use nobox_store::Value;
    ///
    /// assert_eq!(Value::infer("30"), Value::Int(30));
    /// assert_eq!(Value::infer("3.5"), Value::Float(3.5));
    /// assert_eq!(Value::infer("Alice"), Value::Str("Alice".into()));
    /// ```
    pub fn infer(text: &str) -> Self {
        if let Ok(n) = text.parse::<i64>() {
            return Self::Int(n);
        }
        if let Ok(n) = text.parse::<u64>() {
            return Self::UInt(n);
        }
        match text.parse::<f64>() {
            Ok(f) if f.is_finite() => Self::Float(f),
            _ => Self::Str(text.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::UInt(n) => write!(f, "{n}"),
            // Keep a trailing ".0" so 3.0 does not read back as an integer.
            Self::Float(x) if x.fract() == 0.0 && x.abs() < 1e16 => write!(f, "{x:.1}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Build a [`Record`] from `(name, value)` pairs.
///
/// ```
/// use nobox_store::{record, Value};
///
/// let r = record([("name", Value::from("Alice")), ("age", Value::from(30))]);
/// assert_eq!(r["age"], Value::Int(30));
/// ```
pub fn record<K, I>(fields: I) -> Record
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    fields.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_numbers_and_strings() {
        assert_eq!(Value::infer("30"), Value::Int(30));
        assert_eq!(Value::infer("-7"), Value::Int(-7));
        assert_eq!(Value::infer("3.5"), Value::Float(3.5));
        assert_eq!(Value::infer("1e3"), Value::Float(1000.0));
        assert_eq!(Value::infer("alice@example.com"), Value::from("alice@example.com"));
        assert_eq!(Value::infer(""), Value::from(""));
    }

    #[test]
    fn infer_never_yields_bool_or_non_finite() {
        assert_eq!(Value::infer("true"), Value::from("true"));
        assert_eq!(Value::infer("inf"), Value::from("inf"));
        assert_eq!(Value::infer("NaN"), Value::from("NaN"));
    }

    #[test]
    fn untagged_json_keeps_types() {
        let r: Record =
            serde_json::from_str(r#"{"age": 30, "score": 3.5, "zip": "02134", "ok": true}"#)
                .unwrap();
        assert_eq!(r["age"], Value::Int(30));
        assert_eq!(r["score"], Value::Float(3.5));
        assert_eq!(r["zip"], Value::from("02134"));
        assert_eq!(r["ok"], Value::Bool(true));
    }

    #[test]
    fn display_matches_text_input() {
        assert_eq!(Value::Int(30).to_string(), "30");
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(2.25).to_string(), "2.25");
        assert_eq!(Value::from("x y").to_string(), "x y");
        assert_eq!(Value::infer(&Value::Float(3.0).to_string()), Value::Float(3.0));
    }

    #[test]
    fn integers_beyond_i64_stay_exact() {
        assert_eq!(Value::infer("18446744073709551615"), Value::UInt(u64::MAX));
        assert_eq!(Value::UInt(u64::MAX).to_string(), "18446744073709551615");

        let r: Record = serde_json::from_str(r#"{"big": 18446744073709551615}"#).unwrap();
        assert_eq!(r["big"], Value::UInt(u64::MAX));
        assert_eq!(
            serde_json::to_string(&r).unwrap(),
            r#"{"big":18446744073709551615}"#
        );

        let r: Record = serde_yaml::from_str("big: 18446744073709551615\n").unwrap();
        assert_eq!(r["big"], Value::UInt(u64::MAX));
        assert_eq!(
            serde_yaml::to_string(&r).unwrap(),
            "big: 18446744073709551615\n"
        );
    }

    #[test]
    fn null_and_nested_values_are_rejected() {
        assert!(serde_json::from_str::<Record>(r#"{"x": null}"#).is_err());
        assert!(serde_json::from_str::<Record>(r#"{"x": [1, 2]}"#).is_err());
        assert!(serde_json::from_str::<Record>(r#"{"x": {"y": 1}}"#).is_err());
    }
}
