//! Error types for row decoding

use thiserror::Error;

/// Reasons a sheet row cannot become a [`SubmissionRow`](crate::SubmissionRow).
///
/// These never escape the engine: offending rows are skipped and the reason is
/// only reported through `trace` logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("Row {row} has no Team ID column")]
    MissingTeamId { row: usize },

    #[error("Row {row} has a blank Team ID")]
    BlankTeamId { row: usize },
}

impl RowError {
    /// Index of the offending row within the fetched data
    pub fn row(&self) -> usize {
        match self {
            RowError::MissingTeamId { row } | RowError::BlankTeamId { row } => *row,
        }
    }
}
