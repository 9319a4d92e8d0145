use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::database::models::Role;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

/// Role gate. Runs after `jwt_auth_middleware`:
/// `middleware::from_fn_with_state(PUBLISHERS, authorize)`
pub async fn authorize(
    State(allowed): State<&'static [Role]>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(ApiError::not_authorized)?;

    check_role(user, allowed)?;
    Ok(next.run(request).await)
}

pub fn check_role(user: &AuthUser, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "User role '{}' is not authorized to access this route",
            user.role
        )))
    }
}

pub const PUBLISHERS: &[Role] = &[Role::Publisher, Role::Admin];
pub const REVIEWERS: &[Role] = &[Role::User, Role::Admin];
pub const ADMINS: &[Role] = &[Role::Admin];
