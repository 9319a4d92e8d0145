// handlers/auth.rs - /api/v1/auth/* handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, TokenResponse};
use crate::services::user_service::{LoginUser, RegisterUser, UpdateDetails, UpdatePassword};
use crate::services::UserService;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ForgotPassword {
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetPassword {
    pub password: Option<String>,
}

/// POST /auth/register - Create an account and receive a token
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterUser>, JsonRejection>,
) -> Result<TokenResponse, ApiError> {
    let Json(input) = body?;
    let (_, token) = UserService::new(&state).register(input).await?;
    Ok(TokenResponse::created(token))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginUser>, JsonRejection>,
) -> Result<TokenResponse, ApiError> {
    let Json(input) = body?;
    let (user, token) = UserService::new(&state).login(input).await?;
    tracing::info!("User {} logged in", user.id);
    Ok(TokenResponse::ok(token))
}

/// GET /auth/me - Current account
pub async fn me(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<User> {
    Ok(ApiResponse::success(UserService::new(&state).get(user.id).await?))
}

/// PUT /auth/updatedetails
pub async fn update_details(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<UpdateDetails>, JsonRejection>,
) -> ApiResult<User> {
    let Json(input) = body?;
    Ok(ApiResponse::success(UserService::new(&state).update_details(user.id, input).await?))
}

/// PUT /auth/updatepassword - Returns a fresh token
pub async fn update_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<UpdatePassword>, JsonRejection>,
) -> Result<TokenResponse, ApiError> {
    let Json(input) = body?;
    let token = UserService::new(&state).update_password(user.id, input).await?;
    Ok(TokenResponse::ok(token))
}

/// POST /auth/forgotpassword
///
/// No mail is sent; the plaintext token is returned in the response body.
pub async fn forgot_password(
    State(state): State<AppState>,
    body: Result<Json<ForgotPassword>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(input) = body?;
    let token = UserService::new(&state).forgot_password(input.email.as_deref()).await?;
    Ok(ApiResponse::success(json!({
        "resetToken": token.plaintext,
        "expiresAt": token.expires_at,
    })))
}

/// PUT /auth/resetpassword/:resettoken
pub async fn reset_password(
    State(state): State<AppState>,
    Path(reset_token): Path<String>,
    body: Result<Json<ResetPassword>, JsonRejection>,
) -> Result<TokenResponse, ApiError> {
    let Json(input) = body?;
    let (user, token) = UserService::new(&state)
        .reset_password(&reset_token, input.password.as_deref())
        .await?;
    tracing::info!("Password reset for user {}", user.id);
    Ok(TokenResponse::ok(token))
}
