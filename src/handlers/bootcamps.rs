// handlers/bootcamps.rs - /api/v1/bootcamps handlers

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use super::{filter_data, QueryPairs};
use crate::database::models::Bootcamp;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ListResponse};
use crate::services::bootcamp_service::{BootcampInput, UploadedFile};
use crate::services::validation::parse_id;
use crate::services::BootcampService;
use crate::state::AppState;

const PHOTO_FIELD: &str = "file";

/// GET /bootcamps - Filtered, sorted, paginated list with courses attached
pub async fn list(State(state): State<AppState>, query: QueryPairs) -> Result<ListResponse<Value>, ApiError> {
    let data = filter_data(&Bootcamp::SCHEMA, query, &state.config.filter)?;
    Ok(BootcampService::new(&state).list(&data).await?.into())
}

/// GET /bootcamps/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Bootcamp> {
    let id = parse_id("Bootcamp", &id)?;
    Ok(ApiResponse::success(BootcampService::new(&state).get(id).await?))
}

/// POST /bootcamps
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<BootcampInput>, JsonRejection>,
) -> ApiResult<Bootcamp> {
    let Json(input) = body?;
    Ok(ApiResponse::created(BootcampService::new(&state).create(&user, input).await?))
}

/// PUT /bootcamps/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<BootcampInput>, JsonRejection>,
) -> ApiResult<Bootcamp> {
    let id = parse_id("Bootcamp", &id)?;
    let Json(input) = body?;
    Ok(ApiResponse::success(BootcampService::new(&state).update(id, &user, input).await?))
}

/// DELETE /bootcamps/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id("Bootcamp", &id)?;
    BootcampService::new(&state).delete(id, &user).await?;
    Ok(ApiResponse::success(json!({})))
}

/// GET /bootcamps/radius/:zipcode/:distance
pub async fn radius(
    State(state): State<AppState>,
    Path((zipcode, distance)): Path<(String, String)>,
) -> Result<ListResponse<Bootcamp>, ApiError> {
    let bootcamps = BootcampService::new(&state).within_radius(&zipcode, &distance).await?;
    Ok(ListResponse::all(bootcamps))
}

/// PUT /bootcamps/:id/photo - multipart upload, field `file`
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<String> {
    let id = parse_id("Bootcamp", &id)?;
    let mut multipart = multipart.map_err(|_| ApiError::bad_request("Please upload a file"))?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| ApiError::bad_request(e.body_text()))?;
        upload = Some(UploadedFile { file_name, content_type, bytes: bytes.to_vec() });
        break;
    }

    let file = upload.ok_or_else(|| ApiError::bad_request("Please upload a file"))?;
    let stored = BootcampService::new(&state).upload_photo(id, &user, file).await?;
    Ok(ApiResponse::success(stored))
}
