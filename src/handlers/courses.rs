// handlers/courses.rs - /api/v1/courses and /api/v1/bootcamps/:id/courses handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use super::{filter_data, QueryPairs};
use crate::database::models::Course;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ListResponse};
use crate::services::course_service::CourseInput;
use crate::services::validation::parse_id;
use crate::services::CourseService;
use crate::state::AppState;

/// GET /courses
pub async fn list(State(state): State<AppState>, query: QueryPairs) -> Result<ListResponse<Value>, ApiError> {
    let data = filter_data(&Course::SCHEMA, query, &state.config.filter)?;
    Ok(CourseService::new(&state).list(&data).await?.into())
}

/// GET /bootcamps/:id/courses - unpaginated
pub async fn list_for_bootcamp(
    State(state): State<AppState>,
    Path(bootcamp_id): Path<String>,
) -> Result<ListResponse<Course>, ApiError> {
    let bootcamp_id = parse_id("Bootcamp", &bootcamp_id)?;
    let courses = CourseService::new(&state).list_for_bootcamp(bootcamp_id).await?;
    Ok(ListResponse::all(courses))
}

/// GET /courses/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Course> {
    let id = parse_id("Course", &id)?;
    Ok(ApiResponse::success(CourseService::new(&state).get(id).await?))
}

/// POST /bootcamps/:id/courses
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(bootcamp_id): Path<String>,
    body: Result<Json<CourseInput>, JsonRejection>,
) -> ApiResult<Course> {
    let bootcamp_id = parse_id("Bootcamp", &bootcamp_id)?;
    let Json(input) = body?;
    Ok(ApiResponse::created(
        CourseService::new(&state).create(bootcamp_id, &user, input).await?,
    ))
}

/// PUT /courses/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<CourseInput>, JsonRejection>,
) -> ApiResult<Course> {
    let id = parse_id("Course", &id)?;
    let Json(input) = body?;
    Ok(ApiResponse::success(CourseService::new(&state).update(id, &user, input).await?))
}

/// DELETE /courses/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id("Course", &id)?;
    CourseService::new(&state).delete(id, &user).await?;
    Ok(ApiResponse::success(json!({})))
}
