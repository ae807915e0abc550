//! # Pipeline Error Types
//!
//! Every failure of a method's Loader → Renderer pass is described by a
//! [`ReportError`]. Each variant carries the method name so that a diagnostic
//! can be printed without re-running, and the failing [`Stage`] can be
//! recovered with [`ReportError::stage`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage in which an error was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Reading and validating the benchmark table
    Load,
    /// Deriving metrics and persisting the chart
    Render,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Load => write!(f, "load"),
            Stage::Render => write!(f, "render"),
        }
    }
}

/// Errors raised by a single method's pipeline pass
#[derive(Debug, Error)]
pub enum ReportError {
    /// The source table could not be located or opened
    #[error("[{method}] cannot open benchmark table {}: {source}", path.display())]
    DataSource {
        method: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required column is absent from the header
    #[error("[{method}] benchmark table is missing required column '{column}'")]
    Schema { method: String, column: String },

    /// A data row could not be parsed or violates a column constraint
    ///
    /// `row` is the 1-based data row number, the header is not counted.
    #[error("[{method}] malformed row {row}: {reason}")]
    MalformedRow {
        method: String,
        row: usize,
        reason: String,
    },

    /// The table has no data rows
    #[error("[{method}] benchmark table has no data rows, nothing to plot")]
    EmptyTable { method: String },

    /// The chart could not be drawn or persisted
    #[error("[{method}] failed to render {}: {message}", path.display())]
    Render {
        method: String,
        path: PathBuf,
        message: String,
    },
}

impl ReportError {
    /// Method whose pass failed
    pub fn method(&self) -> &str {
        match self {
            ReportError::DataSource { method, .. }
            | ReportError::Schema { method, .. }
            | ReportError::MalformedRow { method, .. }
            | ReportError::EmptyTable { method }
            | ReportError::Render { method, .. } => method,
        }
    }

    /// Stage of the pass that failed
    ///
    /// An empty table is only detected once grouping starts, so it is
    /// reported as a render-stage failure.
    pub fn stage(&self) -> Stage {
        match self {
            ReportError::DataSource { .. }
            | ReportError::Schema { .. }
            | ReportError::MalformedRow { .. } => Stage::Load,
            ReportError::EmptyTable { .. } | ReportError::Render { .. } => Stage::Render,
        }
    }

    pub(crate) fn render(method: &str, path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        ReportError::Render {
            method: method.to_string(),
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}
