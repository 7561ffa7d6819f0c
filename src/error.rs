use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool discovers, parses, or emits tables.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or listing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the JSON report cannot be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the base directory or a mode directory is absent.
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// Raised when a table has none of the accepted identifier columns.
    #[error(
        "no identifier column ('#OTU ID', 'OTU ID' or 'Taxon') in {}; found {found:?}",
        path.display()
    )]
    MissingColumn { path: PathBuf, found: Vec<String> },

    /// Raised when a table cannot be read as tab-delimited text.
    #[error("failed to parse {} (line {line}): {message}", path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },

    /// Raised when the finished workbook cannot be persisted.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Raised when no level directory yielded a table.
    #[error("no tables found under {}", .0.display())]
    EmptyWorkbook(PathBuf),

    /// Raised when a sheet does not follow the expected layout on read-back.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
