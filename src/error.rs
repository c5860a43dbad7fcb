//! Error types for dump parsing and dump acquisition.

use thiserror::Error;

/// Errors raised while obtaining or parsing a schema dump.
///
/// Every variant is fatal: a parse that fails produces no partial schema.
#[derive(Debug, Error)]
pub enum Error {
    /// A strict state rejected the token, or a column type is not supported.
    #[error("unexpected token: `{token}`")]
    UnexpectedToken { token: String },

    #[error("invalid primary key: table `{table}` was not declared")]
    UnknownTable { table: String },

    #[error("invalid primary key: column `{column}` not found in table `{table}`")]
    UnknownColumn { table: String, column: String },

    /// Input ended while a statement was still open.
    #[error("unterminated statement: input ended in state {state}")]
    UnterminatedStatement { state: String },

    #[error("unsupported dump source: {path} (expected a .sql file)")]
    UnsupportedSource { path: String },

    #[error("pg_dump exited with {status}: {stderr}")]
    PgDump { status: String, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn unexpected(token: &str) -> Self {
        Error::UnexpectedToken {
            token: token.to_string(),
        }
    }
}

/// Result type alias for dump operations
pub type Result<T> = std::result::Result<T, Error>;
