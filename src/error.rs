// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::auth::password::PasswordError;
use crate::auth::JwtError;
use crate::database::manager::DatabaseError;
use crate::filter::error::FilterError;
use crate::services::geocoder::GeocodeError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error (geocoder, file store)
    UpstreamError(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UpstreamError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::ValidationError(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::UpstreamError(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to the error envelope: `{ "success": false, "error": "..." }`
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.message(),
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        ApiError::ValidationError(message.into())
    }

    /// Collapse a list of field messages into a single validation error
    pub fn validation_errors(messages: Vec<String>) -> Self {
        ApiError::ValidationError(messages.join(", "))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        ApiError::UpstreamError(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }

    /// Shared 401 for every failed authentication step
    pub fn not_authorized() -> Self {
        ApiError::unauthorized("Not authorized to access this route")
    }

    /// Identical response for unknown email and wrong password
    pub fn invalid_credentials() -> Self {
        ApiError::unauthorized("Invalid credentials")
    }
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::QueryError(msg) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database query error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            DatabaseError::Migration(e) => {
                tracing::error!("Migration error: {}", e);
                ApiError::service_unavailable("Service is being updated, please try again later")
            }
            DatabaseError::Sqlx(sqlx_err) => from_sqlx(sqlx_err),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        from_sqlx(err)
    }
}

fn from_sqlx(err: sqlx::Error) -> ApiError {
    if let Some(db_err) = err.as_database_error() {
        // 23505 = unique_violation
        if db_err.code().as_deref() == Some("23505") {
            let message = match db_err.constraint() {
                Some("users_email_key") => "Email is already registered",
                Some("bootcamps_name_key") => "A bootcamp with that name already exists",
                Some("reviews_bootcamp_id_user_id_key") => "User has already submitted a review for this bootcamp",
                _ => "Duplicate field value entered",
            };
            return ApiError::conflict(message);
        }
    }

    match err {
        sqlx::Error::RowNotFound => ApiError::not_found("Resource not found"),
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
            tracing::error!("Database unavailable: {}", err);
            ApiError::service_unavailable("Database temporarily unavailable")
        }
        other => {
            // Log the real error but return generic message
            tracing::error!("SQLx error: {}", other);
            ApiError::internal_server_error("Database error occurred")
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::validation_error(err.to_string())
    }
}

impl From<GeocodeError> for ApiError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::NoMatch(address) => {
                ApiError::validation_error(format!("Could not geocode address '{}'", address))
            }
            other => {
                tracing::error!("Geocoder error: {}", other);
                ApiError::upstream("Geocoding service failed")
            }
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Invalid(reason) => {
                tracing::debug!("Rejected token: {}", reason);
                ApiError::not_authorized()
            }
            other => {
                tracing::error!("Token service error: {}", other);
                ApiError::internal_server_error("Could not issue token")
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        tracing::error!("Password hashing error: {}", err);
        ApiError::internal_server_error("Could not process credentials")
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if self.status_code().is_server_error() {
            tracing::warn!("Responding with {}: {}", self.status_code(), self.message());
        }
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
