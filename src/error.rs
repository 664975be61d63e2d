//! Error taxonomy for the analyzer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can terminate an `analyze` call before a report is produced.
///
/// Deadline exhaustion is never an error (see `config`); these are the only
/// exits, and they all happen before or immediately after graph construction.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AnalysisError {
    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("found non-numeric values in 'amount' column (example row indices: {0:?})")]
    NonNumericAmount(Vec<usize>),

    #[error("timestamps must use format YYYY-MM-DD HH:MM:SS (example row indices: {0:?})")]
    BadTimestamp(Vec<usize>),

    #[error("no valid rows remained after cleaning")]
    EmptyAfterClean,

    #[error("no accounts found in the transaction network")]
    EmptyGraph,
}

/// Caps a list of offending row indices at 10, per §4.1.
pub(crate) fn cap_sample_indices(indices: Vec<usize>) -> Vec<usize> {
    let mut indices = indices;
    indices.truncate(10);
    indices
}
