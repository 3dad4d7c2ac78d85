//! Rendering records for the terminal.

use std::collections::BTreeSet;

use clap::ValueEnum;
use nobox_store::{Collection, Record};

/// Output format for `get` and `all`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns with a record count.
    #[default]
    Table,
    /// One pretty-printed JSON object.
    Json,
    /// One JSON object per line, key in `_key`.
    Jsonl,
    /// `key field:value ...` per line.
    Oneline,
    /// Comma-separated values with a header row.
    Csv,
}

/// Render `records` in the requested format.
pub fn render(records: &Collection, format: OutputFormat) -> Result<String, serde_json::Error> {
    Ok(match format {
        OutputFormat::Table => table(records),
        OutputFormat::Json => serde_json::to_string_pretty(records)?,
        OutputFormat::Jsonl => jsonl(records)?,
        OutputFormat::Oneline => oneline(records),
        OutputFormat::Csv => csv(records),
    })
}

fn field_names(records: &Collection) -> Vec<&str> {
    let fields: BTreeSet<&str> = records
        .values()
        .flat_map(|r| r.keys().map(String::as_str))
        .collect();
    fields.into_iter().collect()
}

fn cell(record: &Record, field: &str) -> String {
    record.get(field).map(ToString::to_string).unwrap_or_default()
}

fn table(records: &Collection) -> String {
    if records.is_empty() {
        return "No records found".to_string();
    }

    let fields = field_names(records);
    let mut columns = vec!["key"];
    columns.extend(fields.iter().copied());

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|(key, record)| {
            let mut row = vec![key.clone()];
            row.extend(fields.iter().map(|f| cell(record, f)));
            row
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(col.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let rule = widths.iter().sum::<usize>() + 3 * (widths.len() - 1);

    let mut out = pad_row(&columns, &widths);
    out.push('\n');
    out.push_str(&"-".repeat(rule));
    for row in &rows {
        out.push('\n');
        out.push_str(&pad_row(row, &widths));
    }
    out.push_str(&format!("\n\n{} record(s)", records.len()));
    out
}

fn pad_row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(c, &w)| format!("{:<w$}", c.as_ref()))
        .collect();
    padded.join(" | ").trim_end().to_string()
}

fn jsonl(records: &Collection) -> Result<String, serde_json::Error> {
    let mut lines = Vec::with_capacity(records.len());
    for (key, record) in records {
        let key = serde_json::to_string(key)?;
        let body = serde_json::to_string(record)?;
        // `_key` goes first; the record's own object supplies the rest.
        let line = if record.is_empty() {
            format!("{{\"_key\":{key}}}")
        } else {
            format!("{{\"_key\":{key},{}", &body[1..])
        };
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

fn oneline(records: &Collection) -> String {
    records
        .iter()
        .map(|(key, record)| {
            let mut line = key.clone();
            for (field, value) in record {
                line.push_str(&format!(" {field}:{value}"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn csv(records: &Collection) -> String {
    if records.is_empty() {
        return String::new();
    }

    let fields = field_names(records);
    let mut lines = Vec::with_capacity(records.len() + 1);

    let mut header = vec!["key".to_string()];
    header.extend(fields.iter().map(|f| csv_escape(f)));
    lines.push(header.join(","));

    for (key, record) in records {
        let mut row = vec![csv_escape(key)];
        row.extend(fields.iter().map(|f| csv_escape(&cell(record, f))));
        lines.push(row.join(","));
    }
    lines.join("\n")
}

fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nobox_store::{record, Value};

    fn people() -> Collection {
        let mut c = Collection::new();
        c.insert(
            "bob".into(),
            record([("name", Value::from("Bob")), ("team", Value::from("sales, east"))]),
        );
        c.insert(
            "alice".into(),
            record([("name", Value::from("Alice")), ("age", Value::from(30))]),
        );
        c
    }

    #[test]
    fn table_layout() {
        let out = render(&people(), OutputFormat::Table).unwrap();
        let expected = [
            "key   | age | name  | team".to_string(),
            "-".repeat(33),
            "alice | 30  | Alice |".to_string(),
            "bob   |     | Bob   | sales, east".to_string(),
            String::new(),
            "2 record(s)".to_string(),
        ]
        .join("\n");
        assert_eq!(out, expected);
    }

    #[test]
    fn empty_outputs() {
        let empty = Collection::new();
        assert_eq!(render(&empty, OutputFormat::Table).unwrap(), "No records found");
        assert_eq!(render(&empty, OutputFormat::Csv).unwrap(), "");
        assert_eq!(render(&empty, OutputFormat::Jsonl).unwrap(), "");
        assert_eq!(render(&empty, OutputFormat::Json).unwrap(), "{}");
    }

    #[test]
    fn jsonl_puts_key_first() {
        let mut c = people();
        c.insert("zed".into(), Record::new());
        let out = render(&c, OutputFormat::Jsonl).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], r#"{"_key":"alice","age":30,"name":"Alice"}"#);
        assert_eq!(lines[2], r#"{"_key":"zed"}"#);
    }

    #[test]
    fn oneline_lists_fields() {
        let out = render(&people(), OutputFormat::Oneline).unwrap();
        assert_eq!(
            out,
            "alice age:30 name:Alice\nbob name:Bob team:sales, east"
        );
    }

    #[test]
    fn csv_quotes_when_needed() {
        let mut c = people();
        c.insert(
            "carol".into(),
            record([("name", Value::from("Carol \"CJ\""))]),
        );
        let out = render(&c, OutputFormat::Csv).unwrap();
        assert_eq!(
            out,
            "key,age,name,team\n\
             alice,30,Alice,\n\
             bob,,Bob,\"sales, east\"\n\
             carol,,\"Carol \"\"CJ\"\"\","
        );
    }

    #[test]
    fn json_is_pretty() {
        let mut c = Collection::new();
        c.insert("a".into(), record([("x", Value::from(1.5))]));
        assert_eq!(
            render(&c, OutputFormat::Json).unwrap(),
            "{\n  \"a\": {\n    \"x\": 1.5\n  }\n}"
        );
    }
}
