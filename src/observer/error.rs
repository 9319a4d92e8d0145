use thiserror::Error;

/// Observer failures. Logged by the pipeline, never returned to clients.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ObserverError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),
}

impl From<crate::database::manager::DatabaseError> for ObserverError {
    fn from(error: crate::database::manager::DatabaseError) -> Self {
        ObserverError::DatabaseError(error.to_string())
    }
}

impl From<sqlx::Error> for ObserverError {
    fn from(error: sqlx::Error) -> Self {
        ObserverError::DatabaseError(error.to_string())
    }
}
