//! Error types for sqlb

use thiserror::Error;

/// Result type alias for sqlb operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors raised while defining metadata or composing a statement.
///
/// Composition errors are deferred: a [`SelectQuery`](crate::SelectQuery)
/// records the first one and keeps accepting mutator calls, so callers check
/// [`SelectQuery::error`](crate::SelectQuery::error) or use
/// [`SelectQuery::build`](crate::SelectQuery::build) before trusting a render.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlError {
    /// A JOIN was requested on a statement that has nothing to join against.
    #[error("Invalid join: the statement has no selection to join against")]
    JoinNoSelection,

    /// The ON condition of a JOIN does not reference any selection already
    /// present in the statement.
    #[error("Invalid join: the join condition references no selection in the statement")]
    JoinUnknownTarget,

    /// The join target already takes part in a join of the statement, or
    /// joins itself.
    #[error("Invalid join: the join target is already joined in the statement")]
    JoinDuplicateTarget,

    /// Identifier (table, column or alias name) rejected.
    #[error("Invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    /// The same column name was listed twice in one table definition.
    #[error("Duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// Metadata lookup for a table failed.
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Metadata lookup for a column failed.
    #[error("Unknown column '{column}' on '{table}'")]
    UnknownColumn { table: String, column: String },

    /// Render configuration rejected.
    #[error("Invalid format options: {0}")]
    InvalidFormat(String),

    /// A sub-select used as a derived table exposes no named column.
    #[error("Derived table '{0}' exposes no named column")]
    EmptyDerivedTable(String),
}

impl SqlError {
    /// Create an invalid identifier error
    pub fn invalid_identifier(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown column error
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Check if this is one of the join validation errors
    pub fn is_join_error(&self) -> bool {
        matches!(
            self,
            Self::JoinNoSelection | Self::JoinUnknownTarget | Self::JoinDuplicateTarget
        )
    }

    /// Check if this is a metadata lookup miss
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownTable(_) | Self::UnknownColumn { .. })
    }
}
