// handlers/users.rs - /api/v1/users handlers (admin only)

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Value};

use super::{filter_data, QueryPairs};
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, ListResponse};
use crate::services::user_service::{RegisterUser, UpdateUser};
use crate::services::validation::parse_id;
use crate::services::UserService;
use crate::state::AppState;

/// GET /users
pub async fn list(State(state): State<AppState>, query: QueryPairs) -> Result<ListResponse<Value>, ApiError> {
    let data = filter_data(&User::SCHEMA, query, &state.config.filter)?;
    Ok(UserService::new(&state).list(&data).await?.into())
}

/// GET /users/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    let id = parse_id("User", &id)?;
    Ok(ApiResponse::success(UserService::new(&state).get(id).await?))
}

/// POST /users
pub async fn create(State(state): State<AppState>, body: Result<Json<RegisterUser>, JsonRejection>) -> ApiResult<User> {
    let Json(input) = body?;
    Ok(ApiResponse::created(UserService::new(&state).create(input).await?))
}

/// PUT /users/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateUser>, JsonRejection>,
) -> ApiResult<User> {
    let id = parse_id("User", &id)?;
    let Json(input) = body?;
    Ok(ApiResponse::success(UserService::new(&state).update(id, input).await?))
}

/// DELETE /users/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_id("User", &id)?;
    UserService::new(&state).delete(id).await?;
    Ok(ApiResponse::success(json!({})))
}
