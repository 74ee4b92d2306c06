//! Error types for recommendation lookups and model loading.
//!
//! Two failure classes reach callers: a lookup that names something the
//! model does not know (recoverable, the operator re-selects) and a model
//! store that could not be built (fatal, nothing can be served).

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which identifier table a lookup went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Row of the user cluster table / user factor matrix
    User,
    /// Row of the product cluster table / column of the product factors
    Product,
}

impl EntityKind {
    /// Lowercase name used in messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Product => "product",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for recommendation operations.
///
/// # Examples
///
/// ```
/// use svd_recommender::error::{EntityKind, RecommendError};
///
/// let err = RecommendError::UnknownIdentifier {
///     kind: EntityKind::User,
///     id: "U42".to_string(),
/// };
/// assert!(err.to_string().contains("unknown user id"));
/// ```
#[derive(Debug, Error)]
pub enum RecommendError {
    /// Requested id is absent from the corresponding index map.
    #[error("unknown {kind} id: {id:?}")]
    UnknownIdentifier {
        /// Table the id was looked up in
        kind: EntityKind,
        /// The raw id as requested
        id: String,
    },

    /// Top-N outside the accepted range.
    #[error("invalid top-n: {value}, expected 1..={max}")]
    InvalidTopN {
        /// Requested count
        value: usize,
        /// Configured upper bound
        max: usize,
    },

    /// The model store could not be built.
    #[error("model store unavailable: {0}")]
    ModelStoreUnavailable(#[from] StoreError),
}

impl RecommendError {
    /// Shorthand for [`RecommendError::UnknownIdentifier`].
    #[must_use]
    pub fn unknown(kind: EntityKind, id: &str) -> Self {
        Self::UnknownIdentifier {
            kind,
            id: id.to_string(),
        }
    }

    /// True for errors an operator can recover from by changing the request.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::ModelStoreUnavailable(_))
    }
}

/// Why a model store load failed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Artifact could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// Artifact path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Cluster table is not valid CSV or lacks a required column.
    #[error("invalid cluster table {}: {source}", path.display())]
    Csv {
        /// Table path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: csv::Error,
    },

    /// Numeric artifact is malformed.
    #[error("invalid artifact {}: {message}", path.display())]
    Format {
        /// Artifact path
        path: PathBuf,
        /// What is wrong with it
        message: String,
    },

    /// Artifacts disagree on a shared dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// A numeric artifact contains NaN or infinity.
    #[error("{artifact} contains a non-finite value at ({row}, {col})")]
    NonFinite {
        /// Artifact name
        artifact: &'static str,
        /// Row of the offending entry
        row: usize,
        /// Column of the offending entry
        col: usize,
    },

    /// Singular values were given as a matrix with off-diagonal entries.
    #[error("singular values matrix is not diagonal ({rows}x{cols})")]
    NotDiagonal {
        /// Rows of the supplied matrix
        rows: usize,
        /// Columns of the supplied matrix
        cols: usize,
    },

    /// Identifier appears twice and the duplicate policy is `reject`.
    #[error("duplicate {kind} id {id:?} at rows {first} and {second}")]
    DuplicateIdentifier {
        /// Table kind
        kind: EntityKind,
        /// Duplicated id
        id: String,
        /// Row of the first occurrence
        first: usize,
        /// Row of the repeated occurrence
        second: usize,
    },

    /// A cluster table has no data rows.
    #[error("{kind} cluster table is empty")]
    EmptyTable {
        /// Table kind
        kind: EntityKind,
    },
}

impl StoreError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    pub(crate) fn format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, RecommendError>;
