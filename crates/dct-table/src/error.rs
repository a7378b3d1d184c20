//! Error types for the table crate.

use dct_core::DctError;

/// Errors that can occur while building or exchanging tables.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// A table needs at least one key/value column pair.
    #[error("table must have at least one column pair")]
    ZeroColumns,

    /// The supplied row labels do not match the number of rows.
    #[error("index has {actual} labels but the table has {expected} rows")]
    IndexLength { expected: usize, actual: usize },

    /// More column pairs were requested than a table can hold.
    #[error("{columns} column pairs requested, at most {max} supported")]
    TooManyColumns { columns: usize, max: usize },

    /// A CSV header names the same column twice.
    #[error("duplicate csv header {key:?}")]
    DuplicateHeader { key: String },

    /// A record still holds a nested mapping and cannot become a CSV cell.
    #[error("value for {key:?} is a nested mapping; flatten records before export")]
    NestedValue { key: String },

    /// Mapping transformation failed.
    #[error(transparent)]
    Core(#[from] DctError),

    /// CSV reading or writing failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Underlying file I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for table results.
pub type TableResult<T> = Result<T, TableError>;
