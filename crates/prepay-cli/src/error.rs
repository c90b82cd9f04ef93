//! CLI error types.

use std::path::PathBuf;

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid date format.
    #[error("Invalid date format: {0}. Use YYYY-MM-DD.")]
    InvalidDate(String),

    /// Missing required argument.
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    /// A required column is absent from an input file.
    #[error("{}: missing column '{column}'", file.display())]
    MissingColumn {
        /// Input file.
        file: PathBuf,
        /// Column name.
        column: String,
    },

    /// A cell could not be parsed.
    #[error("{}: line {line}: {reason}", file.display())]
    Parse {
        /// Input file.
        file: PathBuf,
        /// One-based line number.
        line: u64,
        /// What went wrong.
        reason: String,
    },

    /// An input file has no data rows.
    #[error("{}: no data rows", .0.display())]
    Empty(PathBuf),

    /// The requested credit is not in the portfolio.
    #[error("Credit not found: {0}")]
    UnknownCredit(String),

    /// CSV reader error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl CliError {
    /// Parse error at `line` of `file`.
    pub fn parse(file: &std::path::Path, line: u64, reason: impl Into<String>) -> Self {
        Self::Parse {
            file: file.to_path_buf(),
            line,
            reason: reason.into(),
        }
    }
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
