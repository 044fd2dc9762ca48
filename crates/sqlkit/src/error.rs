//! Error types for sqlkit

use crate::builder::OperationKind;
use crate::condition::Operator;
use thiserror::Error;

/// Result type alias for sqlkit operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors raised while building a statement.
///
/// Every variant except [`SqlError::Executor`] is a usage error: the statement
/// under construction is abandoned and the builder must be discarded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SqlError {
    /// A structural call was made before any operation was established.
    #[error("No operation established: call insert/select/update/delete before {0}")]
    NoOperation(&'static str),

    /// A structural call does not match the operation already established.
    #[error("{method} is not valid for {actual} statements")]
    WrongOperation {
        method: &'static str,
        actual: OperationKind,
    },

    /// A second operation-establishing call on the same builder.
    #[error("Operation already established as {0}")]
    OperationAlreadySet(OperationKind),

    /// A column source was already staged for this builder.
    #[error("Column source already set; only one of names/aliases/props/entity may be given")]
    DuplicateColumnSource,

    /// The builder was finalized and its buffer released.
    #[error("Statement builder is already closed")]
    Closed,

    /// A junction without children cannot be rendered.
    #[error("Junction condition ({0}) doesn't include any element")]
    EmptyJunction(Operator),

    /// No columns were staged for a call that needs them.
    #[error("Missing columns: {0}")]
    MissingColumns(String),

    /// Columns were staged but the table was never supplied.
    #[error("Missing table: {0}")]
    MissingTable(String),

    /// UPDATE reached finalize without any SET column.
    #[error("UPDATE requires SET")]
    MissingSet,

    /// Generic validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error reported by a caller-supplied executor.
    #[error("Executor error: {0}")]
    Executor(String),
}

impl SqlError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an executor error
    pub fn executor(message: impl Into<String>) -> Self {
        Self::Executor(message.into())
    }

    /// Check if this is a closed-builder error
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}
