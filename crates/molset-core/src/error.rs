use std::fmt;

use crate::dtype::DType;
use crate::dynamic_shape::SymbolicShape;
use crate::shape::Shape;

/// Why a record does not fit the field set of its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaProblem {
    /// A field declared by the schema is absent from the record.
    Missing,
    /// The record carries a field the (strict) schema does not declare.
    Undeclared,
}

impl fmt::Display for SchemaProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaProblem::Missing => f.write_str("required field is missing"),
            SchemaProblem::Undeclared => f.write_str("field is not declared in the schema"),
        }
    }
}

/// All errors that can occur within molset.
///
/// The first four variants are the record-level failures: a record is either
/// missing/carrying the wrong fields, holds values of the wrong type or shape,
/// or the reader never produced it. All of them are fatal for the record.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A record's field set does not fit the schema.
    #[error("schema mismatch on field '{field}': {problem}")]
    SchemaMismatch { field: String, problem: SchemaProblem },

    /// A field value cannot be coerced to its declared dtype.
    #[error("type mismatch on field '{field}': cannot coerce to {expected} ({detail})")]
    TypeMismatch {
        field: String,
        expected: DType,
        detail: String,
    },

    /// A field's rank or a fixed/symbolic dimension does not match the schema.
    #[error("shape error on field '{field}': expected {expected}, got {got}")]
    ShapeError {
        field: String,
        expected: SymbolicShape,
        got: Shape,
    },

    /// The user reader failed for the item at `index`.
    #[error("reader failed for item {index}: {source}")]
    Reader {
        index: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Element count mismatch when creating a value from a vec.
    #[error("element count mismatch: shape {shape} requires {expected} elements, got {got}")]
    ElementCountMismatch {
        shape: Shape,
        expected: usize,
        got: usize,
    },

    /// Dataset index out of range.
    #[error("index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// No subset with this name exists.
    #[error("unknown subset '{0}'")]
    UnknownSubset(String),

    /// The split configuration cannot be applied.
    #[error("invalid split: {0}")]
    InvalidSplit(String),

    /// A schema descriptor could not be parsed.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Generic message for cases not covered above.
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an error from any string message.
    pub fn msg(s: impl Into<String>) -> Self {
        Error::Msg(s.into())
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Error::SchemaMismatch {
            field: field.into(),
            problem: SchemaProblem::Missing,
        }
    }

    pub fn undeclared(field: impl Into<String>) -> Self {
        Error::SchemaMismatch {
            field: field.into(),
            problem: SchemaProblem::Undeclared,
        }
    }

    /// Wrap a reader failure for the item at `index`.
    pub fn reader(index: usize, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Reader {
            index,
            source: source.into(),
        }
    }

    /// Whether this is a missing/undeclared field error.
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, Error::SchemaMismatch { .. })
    }

    /// The record field the error refers to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::SchemaMismatch { field, .. }
            | Error::TypeMismatch { field, .. }
            | Error::ShapeError { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Convenience Result type used throughout molset.
pub type Result<T> = std::result::Result<T, Error>;

/// Macro for early return with a formatted error message.
/// Usage: `bail!("something went wrong: {}", detail)`
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::Msg(format!($($arg)*)))
    };
}
