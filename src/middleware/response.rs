use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::database::Page;
use crate::filter::Pagination;

/// Wrapper for API responses that automatically adds success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self { data, status_code: None }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self { data, status_code: Some(StatusCode::CREATED) }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);
        match serde_json::to_value(&self.data) {
            Ok(data) => (status, Json(json!({ "success": true, "data": data }))).into_response(),
            Err(e) => serialization_failure(e),
        }
    }
}

/// `{ success, count, pagination?, data }`
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub success: bool,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    pub data: Vec<T>,
}

impl<T: Serialize> ListResponse<T> {
    /// Unpaginated list
    pub fn all(data: Vec<T>) -> Self {
        Self { success: true, count: data.len(), pagination: None, data }
    }
}

impl From<Page> for ListResponse<Value> {
    fn from(page: Page) -> Self {
        Self {
            success: true,
            count: page.count,
            pagination: Some(page.pagination),
            data: page.data,
        }
    }
}

impl<T: Serialize> IntoResponse for ListResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// `{ success, token }` for register, login and password changes
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
    #[serde(skip)]
    pub status_code: StatusCode,
}

impl TokenResponse {
    pub fn ok(token: String) -> Self {
        Self { success: true, token, status_code: StatusCode::OK }
    }

    pub fn created(token: String) -> Self {
        Self { success: true, token, status_code: StatusCode::CREATED }
    }
}

impl IntoResponse for TokenResponse {
    fn into_response(self) -> Response {
        (self.status_code, Json(&self)).into_response()
    }
}

fn serialization_failure(e: serde_json::Error) -> Response {
    tracing::error!("Failed to serialize response data: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "error": "Failed to serialize response data" })),
    )
        .into_response()
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
