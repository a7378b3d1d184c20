//! Tabular views of mappings.
//!
//! Lays a mapping out as a fixed number of key/value column pairs, and moves
//! records between CSV files and mappings.
//!
//! # Key Types
//!
//! - [`Table`] -- Key/value table with optional row labels
//! - [`TableError`] -- Layout, CSV and I/O failures

pub mod error;
pub mod layout;
pub mod records;

pub use error::{TableError, TableResult};
pub use layout::{to_table, Table, MAX_COLUMN_PAIRS};
pub use records::{
    parse_cell, read_records, read_records_from_path, write_nested_records, write_records,
    write_records_to_path,
};
