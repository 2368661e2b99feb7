//! Error types for rwsql

use thiserror::Error;

/// Result type alias for rwsql operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Result type alias for statement construction
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors raised while assembling a statement.
///
/// A builder keeps the first one it hits and reports it from `build()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The statement has no target table
    #[error("{statement}: table cannot be empty")]
    EmptyTable { statement: &'static str },

    /// A struct tag could not be parsed
    #[error("invalid tag `{tag}`: {reason}")]
    InvalidTag { tag: String, reason: String },

    /// A LIKE template was applied to a field that is not text
    #[error("column `{column}`: LIKE operator requires a text value")]
    LikeOnNonText { column: String },

    /// An IN clause was given a scalar
    #[error("`{clause}`: IN argument is not a collection")]
    NotACollection { clause: String },

    /// `Require` rejected a zero value
    #[error("{column} cannot be empty")]
    Required { column: String },

    /// Rows of a multi-row INSERT decompose to different column sets
    #[error("insert row {row}: columns differ from the first row")]
    RowShapeMismatch { row: usize },

    /// INSERT without rows
    #[error("insert: rows is empty")]
    NoRows,

    /// UPDATE without assignments
    #[error("update: SET clause is empty")]
    EmptySet,
}

impl BuildError {
    pub(crate) fn invalid_tag(tag: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTag {
            tag: tag.to_string(),
            reason: reason.into(),
        }
    }
}

/// Error types for database operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// Statement construction failed
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Error reported by a non-PostgreSQL executor
    #[error("Driver error: {0}")]
    Driver(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Invalid cluster or pool configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Commit/rollback requested on a session without a transaction
    #[error("no transaction in progress")]
    NoTransaction,

    /// The rollback that followed an earlier failure failed as well
    #[error("{source} (rollback failed: {rollback})")]
    RollbackFailed {
        source: Box<OrmError>,
        rollback: Box<OrmError>,
    },

    /// A transactional callback panicked; the transaction was rolled back
    #[error("transaction callback panicked: {0}")]
    Panicked(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a driver error for executors that are not backed by tokio-postgres
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver(message.into())
    }

    /// Pair an error with the failure of the rollback that tried to clean up after it
    pub fn with_rollback_failure(self, rollback: OrmError) -> Self {
        Self::RollbackFailed {
            source: Box::new(self),
            rollback: Box::new(rollback),
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error came from statement construction
    pub fn is_build_error(&self) -> bool {
        matches!(self, Self::Build(_))
    }

    /// The error that started the failure, looking through rollback wrappers
    pub fn root(&self) -> &OrmError {
        match self {
            Self::RollbackFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
