//! Key/value table layout.
//!
//! A mapping is spread over `columns` key/value column pairs, filled
//! column-major: with `rows = ceil(len / columns)`, pair `j` holds entries
//! `j * rows .. (j + 1) * rows`. Cells past the last entry take the fill
//! value.

use std::fmt;
use std::io;

use dct_core::Mapping;
use serde_json::Value;
use tracing::debug;

use crate::error::{TableError, TableResult};

/// A table of key/value column pairs.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    /// Column headers: `key`, `value` repeated once per pair.
    pub headers: Vec<String>,
    /// Optional row labels, one per row.
    pub index: Option<Vec<String>>,
    /// Cell values, row by row.
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of key/value column pairs.
    pub fn column_pairs(&self) -> usize {
        self.headers.len() / 2
    }

    fn labels(&self) -> Vec<String> {
        match &self.index {
            Some(index) => index.clone(),
            None => (0..self.rows.len()).map(|i| i.to_string()).collect(),
        }
    }

    /// Render as right-aligned fixed-width text, one line per row.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Write the table as CSV. Row labels, when present, become a leading
    /// column with an empty header.
    pub fn to_csv<W: io::Write>(&self, writer: W) -> TableResult<()> {
        let mut csv = csv::Writer::from_writer(writer);

        let mut header: Vec<&str> = Vec::with_capacity(self.headers.len() + 1);
        if self.index.is_some() {
            header.push("");
        }
        header.extend(self.headers.iter().map(String::as_str));
        csv.write_record(&header)?;

        for (position, row) in self.rows.iter().enumerate() {
            let mut record: Vec<String> = Vec::with_capacity(row.len() + 1);
            if let Some(index) = &self.index {
                record.push(index.get(position).cloned().unwrap_or_default());
            }
            record.extend(row.iter().map(csv_cell));
            csv.write_record(&record)?;
        }
        csv.flush()?;
        Ok(())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = self.labels();
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(display_cell).collect())
            .collect();

        let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write!(f, "{:label_width$}", "")?;
        for (header, width) in self.headers.iter().zip(widths.iter().copied()) {
            write!(f, "  {header:>width$}")?;
        }
        writeln!(f)?;
        for (label, row) in labels.iter().zip(&cells) {
            write!(f, "{label:<label_width$}")?;
            for (cell, width) in row.iter().zip(widths.iter().copied()) {
                write!(f, "  {cell:>width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Largest number of key/value column pairs [`to_table`] lays out.
pub const MAX_COLUMN_PAIRS: usize = 1 << 16;

/// Lay `mapping` out as `columns` key/value column pairs.
///
/// Fails with [`TableError::ZeroColumns`] for `columns == 0`, with
/// [`TableError::TooManyColumns`] above [`MAX_COLUMN_PAIRS`], and with
/// [`TableError::IndexLength`] when `index` does not have one label per row.
///
/// # Examples
///
/// ```
/// use dct_table::to_table;
/// use serde_json::json;
///
/// let mapping = json!({"a": 1, "b": 2, "c": 3});
/// let table = to_table(mapping.as_object().unwrap(), 2, json!(null), None).unwrap();
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.rows[0], vec![json!("a"), json!(1), json!("c"), json!(3)]);
/// assert_eq!(table.rows[1], vec![json!("b"), json!(2), json!(null), json!(null)]);
/// ```
pub fn to_table(
    mapping: &Mapping,
    columns: usize,
    fill: Value,
    index: Option<Vec<String>>,
) -> TableResult<Table> {
    if columns == 0 {
        return Err(TableError::ZeroColumns);
    }
    if columns > MAX_COLUMN_PAIRS {
        return Err(TableError::TooManyColumns {
            columns,
            max: MAX_COLUMN_PAIRS,
        });
    }
    let rows = mapping.len().div_ceil(columns);
    if let Some(index) = &index {
        if index.len() != rows {
            return Err(TableError::IndexLength {
                expected: rows,
                actual: index.len(),
            });
        }
    }

    let entries: Vec<(&String, &Value)> = mapping.iter().collect();
    let table_rows = (0..rows)
        .map(|row| {
            let mut cells = Vec::with_capacity(columns * 2);
            for pair in 0..columns {
                match entries.get(pair * rows + row) {
                    Some((key, value)) => {
                        cells.push(Value::String((*key).clone()));
                        cells.push((*value).clone());
                    }
                    None => {
                        cells.push(fill.clone());
                        cells.push(fill.clone());
                    }
                }
            }
            cells
        })
        .collect();

    let headers = (0..columns)
        .flat_map(|_| ["key".to_string(), "value".to_string()])
        .collect();

    debug!(entries = mapping.len(), columns, rows, "laid out table");
    Ok(Table {
        headers,
        index,
        rows: table_rows,
    })
}

fn display_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => display_cell(other),
    }
}
