//! Error types for kvtable core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in kvtable core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] kvtable_storage::StorageError),

    /// JSON codec error.
    #[error("codec error: {0}")]
    Codec(#[from] kvtable_codec::CodecError),

    /// A required argument was missing or empty.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Which argument was rejected.
        message: String,
    },

    /// The database does not exist.
    ///
    /// `name` is `None` when the lookup was for the implicit current
    /// database and no database is stored at all.
    #[error("database not found{}", .name.as_deref().map(|n| format!(": {n}")).unwrap_or_default())]
    DatabaseNotFound {
        /// Name of the database, if one was given.
        name: Option<String>,
    },

    /// The table does not exist in the database.
    #[error("table not found: {name}")]
    TableNotFound {
        /// Name of the table.
        name: String,
    },

    /// A value referenced a field the table does not declare.
    #[error("field {field} not found in table {table}")]
    FieldNotFound {
        /// The undeclared field.
        field: String,
        /// The table that was written to.
        table: String,
    },
}

impl CoreError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a database not found error for a named database.
    pub fn database_not_found(name: impl Into<String>) -> Self {
        Self::DatabaseNotFound {
            name: Some(name.into()),
        }
    }

    /// Creates a table not found error.
    pub fn table_not_found(name: impl Into<String>) -> Self {
        Self::TableNotFound { name: name.into() }
    }

    /// Creates a field not found error.
    pub fn field_not_found(field: impl Into<String>, table: impl Into<String>) -> Self {
        Self::FieldNotFound {
            field: field.into(),
            table: table.into(),
        }
    }

    /// Returns true for the "does not exist" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::DatabaseNotFound { .. } | Self::TableNotFound { .. } | Self::FieldNotFound { .. }
        )
    }
}
