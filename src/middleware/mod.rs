pub mod auth;
pub mod authorize;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use authorize::{authorize, check_role, ADMINS, PUBLISHERS, REVIEWERS};
pub use response::{ApiResponse, ApiResult, ListResponse, TokenResponse};
