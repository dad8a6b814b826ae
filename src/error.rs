//! Error types for loading trade records and building charts.

use std::path::PathBuf;

use thiserror::Error;

use crate::chart::request::ChartKind;

/// Errors surfaced by the load → filter → build pipeline.
///
/// Date cells that fail to parse are never an error; they are coerced to
/// the unparsable marker at load time.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The records file does not exist. Fatal for the session.
    #[error("file '{}' not found, please select the correct dataset", path.display())]
    SourceNotFound { path: PathBuf },

    /// The records file exists but could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required column is absent from the header row.
    #[error("required column '{column}' not found in {}", path.display())]
    MissingColumn { column: &'static str, path: PathBuf },

    /// A row could not be decoded as CSV.
    #[error("malformed CSV in {}: {message}", path.display())]
    Csv { path: PathBuf, message: String },

    /// A chart type that needs at least one field was given none.
    /// Recoverable: nothing is rendered until the selection is fixed.
    #[error("select at least one field for the {kind} chart")]
    IncompleteSelection { kind: ChartKind },
}

pub type Result<T> = std::result::Result<T, DashboardError>;
