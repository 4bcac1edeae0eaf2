//! Error types for flight log loading and plotting.
//!
//! Not every variant is returned as an `Err`. Missing metadata and "nothing loaded yet"
//! conditions are reported as values (see [`crate::session::LoadReport`] and
//! [`crate::session::Outcome`]) so a session keeps going after them. Direct array loads
//! are the exception and propagate their failures.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for flight data operations.
pub type Result<T, E = FlightDataError> = std::result::Result<T, E>;

/// Which metadata label was omitted at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    LaunchDate,
    BoardVersion,
}

impl std::fmt::Display for MetadataField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataField::LaunchDate => f.write_str("launch date"),
            MetadataField::BoardVersion => f.write_str("board version"),
        }
    }
}

/// Which table an operation needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Packet,
    State,
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableKind::Packet => f.write_str("packet"),
            TableKind::State => f.write_str("state"),
        }
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FlightDataError {
    #[error("No {field} provided")]
    MissingMetadata { field: MetadataField },

    #[error("'{}' is not a valid archive", path.display())]
    InvalidArchive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("'{name}' is missing from the archive")]
    MissingMember { name: String },

    #[error("No {table} data loaded")]
    NoDataLoaded { table: TableKind },

    #[error("Column '{name}' not found in data")]
    ColumnNotFound { name: String },

    #[error("Column '{name}' maps to index {index} but the {table} table has {width} columns")]
    ColumnOutOfRange {
        name: String,
        index: usize,
        width: usize,
        table: TableKind,
    },

    #[error("Column '{name}' has index {index}: {reason}")]
    InvalidLayout { name: String, index: usize, reason: String },

    #[error("Row {row} requested but the {table} table has {rows} rows")]
    RowOutOfRange { row: usize, rows: usize, table: TableKind },

    #[error("'{}' not found", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error on '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed table '{source_name}': {reason}")]
    Format { source_name: String, reason: String },

    #[error("Chart rendering failed: {0}")]
    Render(String),
}

impl FlightDataError {
    /// Map an I/O failure on `path`, keeping `NotFound` distinct.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            FlightDataError::NotFound { path }
        } else {
            FlightDataError::Io { path, source }
        }
    }

    pub fn format(source_name: impl Into<String>, reason: impl ToString) -> Self {
        FlightDataError::Format {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}
