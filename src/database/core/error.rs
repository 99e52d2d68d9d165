//! Error classification for database failures
//!
//! Errors travel as `anyhow::Error`. The DAL and the connection provider only
//! need to know which class a failure belongs to, so this module walks the error
//! chain for the underlying `rusqlite::Error` and maps it onto [`DbErrorKind`].

use rusqlite::ErrorCode;
use serde::Serialize;
use std::fmt;

/// Failure classes with distinct handling rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DbErrorKind {
    /// The engine could not be reached when opening a connection (transient)
    ConnectionRefused,
    /// A unique, check, not-null or foreign-key constraint rejected the statement
    ConstraintViolation,
    /// The statement or schema is invalid (syntax, unknown table, bad parameters)
    MalformedStatement,
    /// Anything else
    Other,
}

impl DbErrorKind {
    /// Only connection-refused failures are worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ConnectionRefused)
    }
}

impl fmt::Display for DbErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionRefused => write!(f, "connection-refused"),
            Self::ConstraintViolation => write!(f, "constraint-violation"),
            Self::MalformedStatement => write!(f, "malformed-statement"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Classify an error by the first engine error found in its chain
pub fn classify(err: &anyhow::Error) -> DbErrorKind {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<rusqlite::Error>())
        .map(classify_sqlite)
        .unwrap_or(DbErrorKind::Other)
}

fn classify_sqlite(err: &rusqlite::Error) -> DbErrorKind {
    use rusqlite::Error;

    if let Some(code) = err.sqlite_error_code() {
        return match code {
            ErrorCode::CannotOpen => DbErrorKind::ConnectionRefused,
            ErrorCode::ConstraintViolation => DbErrorKind::ConstraintViolation,
            // SQLITE_ERROR: syntax errors, missing tables or columns
            ErrorCode::Unknown => DbErrorKind::MalformedStatement,
            _ => DbErrorKind::Other,
        };
    }

    match err {
        // syntax errors carry their code here rather than in SqliteFailure
        Error::SqlInputError { error, .. } => match error.code {
            ErrorCode::ConstraintViolation => DbErrorKind::ConstraintViolation,
            ErrorCode::CannotOpen => DbErrorKind::ConnectionRefused,
            _ => DbErrorKind::MalformedStatement,
        },
        Error::InvalidParameterCount(_, _)
        | Error::InvalidParameterName(_)
        | Error::InvalidColumnName(_)
        | Error::InvalidColumnIndex(_)
        | Error::MultipleStatement
        | Error::ExecuteReturnedResults => DbErrorKind::MalformedStatement,
        _ => DbErrorKind::Other,
    }
}
