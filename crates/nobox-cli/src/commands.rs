use std::io::{BufRead, Read};

use nobox_store::{Catalog, Collection, Driver};

use crate::error::CliError;
use crate::format::{render, OutputFormat};
use crate::import::{import_json, import_lines, ImportReport};
use crate::input::parse_fields;

type Result = std::result::Result<(), CliError>;

/// Import errors shown before the rest are summarized.
const MAX_REPORTED_ERRORS: usize = 5;

/// `nobox databases`: list every database of the current format.
pub fn databases<D: Driver + Clone>(catalog: &Catalog<D>) -> Result {
    let databases = catalog.list_databases()?;

    if databases.is_empty() {
        println!("No databases found in {} format", D::NAME);
        return Ok(());
    }

    println!("Databases ({}):", D::NAME);
    for db in &databases {
        println!("  {db}");
    }
    println!();
    println!("{} database(s)", databases.len());
    Ok(())
}

/// `nobox collections <db>`: list the collections of a database.
pub fn collections<D: Driver + Clone>(catalog: &Catalog<D>, db: &str) -> Result {
    let store = catalog.open(db)?;
    let collections = store.list_collections()?;

    if collections.is_empty() {
        println!("No collections found in database '{db}'");
        return Ok(());
    }

    println!("Collections in '{db}':");
    for coll in &collections {
        println!("  {coll}");
    }
    println!();
    println!("{} collection(s)", collections.len());
    Ok(())
}

/// `nobox set <db> <collection> <key> <field:value>...`
pub fn set<D: Driver + Clone>(
    catalog: &Catalog<D>,
    db: &str,
    collection: &str,
    key: &str,
    fields: &[String],
) -> Result {
    // Validate every token before opening anything.
    let record = parse_fields(fields)?;

    let mut store = catalog.open(db)?;
    store.set(collection, key, record)?;
    println!("Set record '{key}' in {collection}");
    Ok(())
}

/// `nobox get <db> <collection> <key>`
pub fn get<D: Driver + Clone>(
    catalog: &Catalog<D>,
    db: &str,
    collection: &str,
    key: &str,
    output: OutputFormat,
) -> Result {
    let single = fetch(catalog, db, collection, key)?;
    print_rendered(&single, output)
}

/// The record at `key` as a one-entry collection under its stored key,
/// which differs from `key` under lowercase key casing.
fn fetch<D: Driver + Clone>(
    catalog: &Catalog<D>,
    db: &str,
    collection: &str,
    key: &str,
) -> std::result::Result<Collection, CliError> {
    let store = catalog.open(db)?;
    let record = store
        .get(collection, key)?
        .ok_or_else(|| CliError::RecordNotFound(key.to_string()))?;

    let stored = store.config().key_casing.normalize(key).into_owned();
    Ok(Collection::from([(stored, record)]))
}

/// `nobox del <db> <collection> <key>`
pub fn del<D: Driver + Clone>(
    catalog: &Catalog<D>,
    db: &str,
    collection: &str,
    key: &str,
) -> Result {
    let mut store = catalog.open(db)?;
    if !store.delete(collection, key)? {
        return Err(CliError::RecordNotFound(key.to_string()));
    }
    println!("Deleted record '{key}' from {collection}");
    Ok(())
}

/// `nobox keys <db> <collection>`
pub fn keys<D: Driver + Clone>(catalog: &Catalog<D>, db: &str, collection: &str) -> Result {
    let store = catalog.open(db)?;
    let keys = store.keys(collection)?;

    if keys.is_empty() {
        println!("No records in {collection}");
    }
    for key in &keys {
        println!("{key}");
    }
    Ok(())
}

/// `nobox all <db> <collection>`
pub fn all<D: Driver + Clone>(
    catalog: &Catalog<D>,
    db: &str,
    collection: &str,
    output: OutputFormat,
) -> Result {
    let store = catalog.open(db)?;
    let records = store.all(collection)?;
    print_rendered(&records, output)
}

/// `nobox count <db> <collection>`
pub fn count<D: Driver + Clone>(catalog: &Catalog<D>, db: &str, collection: &str) -> Result {
    let store = catalog.open(db)?;
    println!("{}", store.count(collection)?);
    Ok(())
}

/// `nobox drop <db> [collection]`: delete a collection, or the whole
/// database when no collection is given.
pub fn drop<D: Driver + Clone>(
    catalog: &Catalog<D>,
    db: &str,
    collection: Option<&str>,
) -> Result {
    match collection {
        Some(collection) => {
            let mut store = catalog.open(db)?;
            if !store.delete_collection(collection)? {
                return Err(CliError::CollectionNotFound {
                    db: db.to_string(),
                    collection: collection.to_string(),
                });
            }
            println!("Deleted collection '{collection}' from database '{db}'");
        }
        None => {
            let removed = catalog
                .delete_database(db)?
                .ok_or_else(|| CliError::DatabaseNotFound(db.to_string()))?;
            println!("Deleted database '{db}' ({removed} collection(s))");
        }
    }
    Ok(())
}

/// `nobox import <db> <collection>`: bulk import from `input` (stdin).
pub fn import<D: Driver + Clone, R: BufRead>(
    catalog: &Catalog<D>,
    db: &str,
    collection: &str,
    json: bool,
    mut input: R,
) -> Result {
    let mut store = catalog.open(db)?;

    let report = if json {
        let mut content = String::new();
        input.read_to_string(&mut content)?;
        import_json(&mut store, collection, &content)
    } else {
        import_lines(&mut store, collection, input)?
    };

    print_import_report(&report, collection);

    if report.imported == 0 {
        return Err(CliError::NothingImported(collection.to_string()));
    }
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────────

fn print_rendered(records: &Collection, output: OutputFormat) -> Result {
    let text = render(records, output)?;
    if !text.is_empty() {
        println!("{text}");
    }
    Ok(())
}

fn print_import_report(report: &ImportReport, collection: &str) {
    println!("Imported {} record(s) into {collection}", report.imported);

    if report.errors.is_empty() {
        return;
    }
    eprintln!("{} line(s) skipped due to errors:", report.errors.len());
    for (line, message) in report.errors.iter().take(MAX_REPORTED_ERRORS) {
        eprintln!("  Line {line}: {message}");
    }
    if report.errors.len() > MAX_REPORTED_ERRORS {
        eprintln!(
            "  ... and {} more",
            report.errors.len() - MAX_REPORTED_ERRORS
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nobox_store::{JsonDriver, KeyCasing, StoreConfig, Value, YamlDriver};
    use tempfile::{tempdir, TempDir};

    fn json_catalog() -> (TempDir, Catalog<JsonDriver>) {
        let dir = tempdir().unwrap();
        let catalog = Catalog::new(JsonDriver, StoreConfig::new(dir.path()));
        (dir, catalog)
    }

    fn fields(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn set_then_get_and_delete() {
        let (_dir, catalog) = json_catalog();
        set(&catalog, "db", "users", "alice", &fields(&["name:Alice", "age:30"])).unwrap();

        let single = fetch(&catalog, "db", "users", "alice").unwrap();
        assert_eq!(single["alice"]["age"], Value::Int(30));
        get(&catalog, "db", "users", "alice", OutputFormat::Json).unwrap();

        del(&catalog, "db", "users", "alice").unwrap();
        assert_eq!(catalog.open("db").unwrap().count("users").unwrap(), 0);
    }

    #[test]
    fn missing_record_is_not_found() {
        let (_dir, catalog) = json_catalog();
        set(&catalog, "db", "users", "alice", &fields(&["a:1"])).unwrap();

        for result in [
            get(&catalog, "db", "users", "bob", OutputFormat::Table),
            del(&catalog, "db", "users", "bob"),
            del(&catalog, "nodb", "users", "alice"),
        ] {
            match result {
                Err(CliError::RecordNotFound(key)) => assert!(key == "bob" || key == "alice"),
                other => panic!("expected RecordNotFound, got {other:?}"),
            }
        }
    }

    #[test]
    fn drop_reports_missing_targets() {
        let (_dir, catalog) = json_catalog();
        set(&catalog, "db", "users", "alice", &fields(&["a:1"])).unwrap();

        assert!(matches!(
            drop(&catalog, "db", Some("orders")),
            Err(CliError::CollectionNotFound { ref db, ref collection })
                if db == "db" && collection == "orders"
        ));
        assert!(matches!(
            drop(&catalog, "ghost", None),
            Err(CliError::DatabaseNotFound(ref db)) if db == "ghost"
        ));

        drop(&catalog, "db", Some("users")).unwrap();
        drop(&catalog, "db", None).unwrap();
        assert!(catalog.list_databases().unwrap().is_empty());
    }

    #[test]
    fn invalid_field_writes_nothing() {
        let (dir, catalog) = json_catalog();
        let err = set(&catalog, "db", "users", "alice", &fields(&["oops"])).unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn import_with_no_successes_fails() {
        let (_dir, catalog) = json_catalog();

        let err = import(&catalog, "db", "users", false, "broken\n# note\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, CliError::NothingImported(ref c) if c == "users"));

        let err = import(&catalog, "db", "users", true, "".as_bytes()).unwrap_err();
        assert!(matches!(err, CliError::NothingImported(_)));
    }

    #[test]
    fn import_reads_lines_and_json() {
        let (_dir, catalog) = json_catalog();

        import(
            &catalog,
            "db",
            "users",
            false,
            "alice name:Alice\nbroken\n".as_bytes(),
        )
        .unwrap();
        import(&catalog, "db", "users", true, r#"{"bob": {"age": 4}}"#.as_bytes()).unwrap();

        let store = catalog.open("db").unwrap();
        assert_eq!(store.keys("users").unwrap(), vec!["alice", "bob"]);
    }

    #[test]
    fn lowercase_get_uses_stored_key() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::builder(dir.path())
            .key_casing(KeyCasing::Lowercase)
            .build();
        let catalog = Catalog::new(YamlDriver, config);
        set(&catalog, "db", "users", "Alice", &fields(&["a:1"])).unwrap();

        let single = fetch(&catalog, "db", "users", "ALICE").unwrap();
        assert_eq!(single.keys().collect::<Vec<_>>(), vec!["alice"]);
    }
}
