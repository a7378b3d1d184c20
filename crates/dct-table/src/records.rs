//! CSV records to mappings and back.
//!
//! Each CSV row becomes one mapping keyed by the header row. Cells are
//! typed on import; export writes the union of all record keys as header.

use std::fs::File;
use std::io;
use std::path::Path;

use dct_core::{flatten, Mapping, NormalizeConfig};
use serde_json::{Number, Value};
use tracing::debug;

use crate::error::{TableError, TableResult};

/// Type a CSV cell: empty is `null`, then integer, float, boolean, string.
///
/// Numbers are only recognized in the form they are exported in, so a cell
/// written by [`write_records`] reads back as the same value. Text such as
/// `"+5"`, `"007"` or `"1e3"` stays a string.
pub fn parse_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(int) = cell.parse::<i64>() {
        if int.to_string() == cell {
            return Value::from(int);
        }
    }
    if let Some(number) = cell.parse::<f64>().ok().and_then(Number::from_f64) {
        if number.to_string() == cell {
            return Value::Number(number);
        }
    }
    match cell {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(cell.to_string()),
    }
}

/// Read CSV with a header row into one mapping per row.
pub fn read_records<R: io::Read>(reader: R) -> TableResult<Vec<Mapping>> {
    let mut csv = csv::Reader::from_reader(reader);
    let headers = csv.headers()?.clone();
    for (position, header) in headers.iter().enumerate() {
        if headers.iter().take(position).any(|earlier| earlier == header) {
            return Err(TableError::DuplicateHeader {
                key: header.to_string(),
            });
        }
    }

    let mut records = Vec::new();
    for row in csv.records() {
        let row = row?;
        let record: Mapping = headers
            .iter()
            .zip(row.iter())
            .map(|(header, cell)| (header.to_string(), parse_cell(cell)))
            .collect();
        records.push(record);
    }
    debug!(columns = headers.len(), records = records.len(), "read csv records");
    Ok(records)
}

/// Read a CSV file into mappings.
pub fn read_records_from_path(path: impl AsRef<Path>) -> TableResult<Vec<Mapping>> {
    let file = File::open(path)?;
    read_records(file)
}

/// Write flat records as CSV.
///
/// The header is the union of keys in first-seen order; missing cells and
/// `null` are empty. A non-empty mapping value fails with
/// [`TableError::NestedValue`].
pub fn write_records<W: io::Write>(records: &[Mapping], writer: W) -> TableResult<()> {
    let mut columns: Vec<&str> = Vec::new();
    for record in records {
        for (key, value) in record {
            if matches!(value, Value::Object(inner) if !inner.is_empty()) {
                return Err(TableError::NestedValue { key: key.clone() });
            }
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(&columns)?;
    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|column| match record.get(*column) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            })
            .collect();
        csv.write_record(&row)?;
    }
    csv.flush()?;
    debug!(columns = columns.len(), records = records.len(), "wrote csv records");
    Ok(())
}

/// Flatten nested records with `config`, then write them as CSV.
pub fn write_nested_records<W: io::Write>(
    records: &[Mapping],
    config: &NormalizeConfig,
    writer: W,
) -> TableResult<()> {
    let flat = records
        .iter()
        .map(|record| flatten(record, config))
        .collect::<Result<Vec<_>, _>>()?;
    write_records(&flat, writer)
}

/// Write flat records to a CSV file, replacing it if present.
pub fn write_records_to_path(records: &[Mapping], path: impl AsRef<Path>) -> TableResult<()> {
    let file = File::create(path)?;
    write_records(records, file)
}
