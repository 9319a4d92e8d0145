// handlers/reviews.rs - /api/v1/reviews and /api/v1/bootcamps/:id/reviews handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use super::{filter_data, QueryPairs};
use crate::database::models::Review;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ListResponse};
use crate::services::review_service::ReviewInput;
use crate::services::validation::parse_id;
use crate::services::ReviewService;
use crate::state::AppState;

/// GET /reviews
pub async fn list(State(state): State<AppState>, query: QueryPairs) -> Result<ListResponse<Value>, ApiError> {
    let data = filter_data(&Review::SCHEMA, query, &state.config.filter)?;
    Ok(ReviewService::new(&state).list(&data).await?.into())
}

/// GET /bootcamps/:id/reviews
pub async fn list_for_bootcamp(
    State(state): State<AppState>,
    Path(bootcamp_id): Path<String>,
) -> Result<ListResponse<Review>, ApiError> {
    let bootcamp_id = parse_id("Bootcamp", &bootcamp_id)?;
    let reviews = ReviewService::new(&state).list_for_bootcamp(bootcamp_id).await?;
    Ok(ListResponse::all(reviews))
}

/// GET /reviews/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Review> {
    let id = parse_id("Review", &id)?;
    Ok(ApiResponse::success(ReviewService::new(&state).get(id).await?))
}

/// POST /bootcamps/:id/reviews
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(bootcamp_id): Path<String>,
    body: Result<Json<ReviewInput>, JsonRejection>,
) -> ApiResult<Review> {
    let bootcamp_id = parse_id("Bootcamp", &bootcamp_id)?;
    let Json(input) = body?;
    Ok(ApiResponse::created(
        ReviewService::new(&state).create(bootcamp_id, &user, input).await?,
    ))
}

/// PUT /reviews/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<ReviewInput>, JsonRejection>,
) -> ApiResult<Review> {
    let id = parse_id("Review", &id)?;
    let Json(input) = body?;
    Ok(ApiResponse::success(ReviewService::new(&state).update(id, &user, input).await?))
}

/// DELETE /reviews/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id("Review", &id)?;
    ReviewService::new(&state).delete(id, &user).await?;
    Ok(ApiResponse::success(json!({})))
}
