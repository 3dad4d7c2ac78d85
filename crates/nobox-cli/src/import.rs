//! Bulk import from a reader (stdin in practice).
//!
//! Every record is an independent `set`. A bad line is recorded and the
//! import moves on; only a failure to read the input itself aborts.

use std::io::BufRead;

use nobox_store::{Collection, DictStore, Driver};

use crate::error::CliError;
use crate::input::parse_line;

/// Outcome of an import run.
#[derive(Debug, Default, PartialEq)]
pub struct ImportReport {
    /// Records written.
    pub imported: usize,
    /// `(line number, message)` for every skipped line. Line 0 stands for
    /// the whole input in `--json` mode.
    pub errors: Vec<(usize, String)>,
}

/// Import `key field:value ...` and JSON-lines records, one per line.
///
/// Blank lines and `#` comments are skipped.
pub fn import_lines<D: Driver, R: BufRead>(
    store: &mut DictStore<D>,
    collection: &str,
    reader: R,
) -> Result<ImportReport, CliError> {
    let mut report = ImportReport::default();

    for (idx, line) in reader.lines().enumerate() {
        let line_num = idx + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let outcome = parse_line(line)
            .map_err(CliError::from)
            .and_then(|(key, record)| {
                store
                    .set(collection, &key, record)
                    .map_err(CliError::from)
            });
        match outcome {
            Ok(()) => report.imported += 1,
            Err(e) => {
                tracing::debug!(line = line_num, error = %e, "skipping import line");
                report.errors.push((line_num, e.to_string()));
            }
        }
    }

    Ok(report)
}

/// Import a single JSON object mapping keys to records.
pub fn import_json<D: Driver>(
    store: &mut DictStore<D>,
    collection: &str,
    content: &str,
) -> ImportReport {
    let mut report = ImportReport::default();
    if content.trim().is_empty() {
        return report;
    }

    let records: Collection = match serde_json::from_str(content) {
        Ok(records) => records,
        Err(e) => {
            report.errors.push((0, format!("JSON parse error: {e}")));
            return report;
        }
    };

    for (key, record) in records {
        match store.set(collection, &key, record) {
            Ok(()) => report.imported += 1,
            Err(e) => report.errors.push((0, format!("{key}: {e}"))),
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use nobox_store::{JsonDriver, StoreConfig, Value, YamlDriver};
    use tempfile::tempdir;

    const DATA: &str = "\
# team roster
alice name:Alice email:alice@example.com age:30

bob name:Bob department:engineering salary:75000
broken
{\"_key\": \"carol\", \"role\": \"manager\"}
{\"role\": \"nobody\"}
dave name:Dave oops
";

    #[test]
    fn lines_continue_past_errors() {
        let dir = tempdir().unwrap();
        let mut store = DictStore::open("db", JsonDriver, StoreConfig::new(dir.path())).unwrap();

        let report = import_lines(&mut store, "people", DATA.as_bytes()).unwrap();

        assert_eq!(report.imported, 3);
        let lines: Vec<usize> = report.errors.iter().map(|(n, _)| *n).collect();
        assert_eq!(lines, vec![5, 7, 8]);
        assert_eq!(report.errors[0].1, "Invalid format: broken");
        assert_eq!(report.errors[1].1, "JSON Line missing '_key' field");

        assert_eq!(store.keys("people").unwrap(), vec!["alice", "bob", "carol"]);
        let bob = store.get("people", "bob").unwrap().unwrap();
        assert_eq!(bob["salary"], Value::Int(75000));
    }

    #[test]
    fn json_object_import() {
        let dir = tempdir().unwrap();
        let mut store = DictStore::open("db", YamlDriver, StoreConfig::new(dir.path())).unwrap();

        let report = import_json(
            &mut store,
            "people",
            r#"{"alice": {"age": 30}, "bob": {"name": "Bob"}}"#,
        );
        assert_eq!(report.imported, 2);
        assert!(report.errors.is_empty());
        assert_eq!(store.count("people").unwrap(), 2);
    }

    #[test]
    fn json_object_errors() {
        let dir = tempdir().unwrap();
        let mut store = DictStore::open("db", JsonDriver, StoreConfig::new(dir.path())).unwrap();

        assert_eq!(import_json(&mut store, "p", "  \n"), ImportReport::default());

        let report = import_json(&mut store, "p", "{\"a\": ");
        assert_eq!(report.imported, 0);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].0, 0);
        assert!(report.errors[0].1.starts_with("JSON parse error"));

        let report = import_json(&mut store, "p", r#"{"": {"a": 1}, "ok": {"a": 2}}"#);
        assert_eq!(report.imported, 1);
        assert_eq!(report.errors.len(), 1);
    }
}
