//! Error types for pgrecord

use thiserror::Error;

/// Result type alias for pgrecord operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Coarse classification of an [`OrmError`].
///
/// Every variant of [`OrmError`] falls into exactly one of these kinds, which is
/// usually all a caller needs to decide between retrying, fixing the entity, or
/// giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The entity mapping could not be read or written.
    Reflection,
    /// The database rejected or failed to run the statement.
    Execution,
    /// The entity has no usable primary key value.
    MissingKey,
    /// Connection acquisition, configuration or anything else.
    Other,
}

/// Error types for entity persistence
#[derive(Debug, Error)]
pub enum OrmError {
    /// An attribute of the entity mapping could not be read or written
    #[error("Reflection error on {entity}.{attribute}: {message}")]
    Reflection {
        entity: String,
        attribute: String,
        message: String,
    },

    /// The entity has no resolvable primary key
    #[error("Missing primary key '{key}' for table {table}")]
    MissingKey { table: String, key: String },

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Statement execution error reported by a non-Postgres client
    #[error("Execution error: {0}")]
    Execution(String),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Generated key decode error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a reflection error for one attribute of an entity
    pub fn reflection(
        entity: impl Into<String>,
        attribute: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Reflection {
            entity: entity.into(),
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Create a missing key error
    pub fn missing_key(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingKey {
            table: table.into(),
            key: key.into(),
        }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an execution error from a non-Postgres client
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Reflection { .. } => ErrorKind::Reflection,
            Self::MissingKey { .. } => ErrorKind::MissingKey,
            Self::Query(_)
            | Self::Execution(_)
            | Self::UniqueViolation(_)
            | Self::ForeignKeyViolation(_)
            | Self::CheckViolation(_)
            | Self::Decode { .. } => ErrorKind::Execution,
            _ => ErrorKind::Other,
        }
    }

    /// Check if this is a missing key error
    pub fn is_missing_key(&self) -> bool {
        self.kind() == ErrorKind::MissingKey
    }

    /// Check if this is a reflection error
    pub fn is_reflection(&self) -> bool {
        self.kind() == ErrorKind::Reflection
    }

    /// Check if this is an execution error
    pub fn is_execution(&self) -> bool {
        self.kind() == ErrorKind::Execution
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Parse a tokio_postgres error into a more specific OrmError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{}: {}", constraint, message)),
                "23503" => {
                    return Self::ForeignKeyViolation(format!("{}: {}", constraint, message));
                }
                "23514" => return Self::CheckViolation(format!("{}: {}", constraint, message)),
                _ => {}
            }
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_cover_the_three_failure_classes() {
        assert_eq!(
            OrmError::reflection("Person", "id", "overflow").kind(),
            ErrorKind::Reflection
        );
        assert_eq!(
            OrmError::missing_key("persons", "id").kind(),
            ErrorKind::MissingKey
        );
        assert_eq!(OrmError::execution("boom").kind(), ErrorKind::Execution);
        assert_eq!(
            OrmError::UniqueViolation("persons_name_key: dup".into()).kind(),
            ErrorKind::Execution
        );
        assert_eq!(
            OrmError::decode("id", "not an integer").kind(),
            ErrorKind::Execution
        );
        assert_eq!(OrmError::validation("bad").kind(), ErrorKind::Other);
    }

    #[test]
    fn missing_key_message_names_table_and_key() {
        let err = OrmError::missing_key("persons", "id");
        assert!(err.is_missing_key());
        assert_eq!(err.to_string(), "Missing primary key 'id' for table persons");
    }

    #[test]
    fn reflection_message_names_attribute() {
        let err = OrmError::reflection("Order", "id", "value out of range");
        assert!(err.is_reflection());
        assert_eq!(
            err.to_string(),
            "Reflection error on Order.id: value out of range"
        );
    }
}
