pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod observer;
pub mod services;
pub mod state;
pub mod types;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::models::Role;
use crate::middleware::{authorize, jwt_auth_middleware, ADMINS, PUBLISHERS, REVIEWERS};

pub use crate::error::ApiError;
pub use crate::state::AppState;

/// Multipart framing on top of the largest accepted photo
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

/// Full application router: `/`, `/health`, `/api/v1/*` and `/uploads/*`
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(public_routes())
        .merge(protected_routes(&state))
        .merge(gated(&state, PUBLISHERS, publisher_routes()))
        .merge(gated(&state, REVIEWERS, reviewer_routes()))
        .merge(gated(&state, ADMINS, admin_routes()));

    let config = state.config.clone();

    Router::new()
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health))
        .nest("/api/v1", api)
        .nest_service("/uploads", ServeDir::new(&config.uploads.file_upload_path))
        .layer(DefaultBodyLimit::max(body_limit(&config)))
        .layer(cors_layer(&config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::{auth, bootcamps, courses, reviews};

    Router::new()
        // Token acquisition
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/forgotpassword", post(auth::forgot_password))
        .route("/auth/resetpassword/:resettoken", put(auth::reset_password))
        // Read-only resources
        .route("/bootcamps", get(bootcamps::list))
        .route("/bootcamps/:id", get(bootcamps::get))
        .route("/bootcamps/radius/:zipcode/:distance", get(bootcamps::radius))
        .route("/bootcamps/:id/courses", get(courses::list_for_bootcamp))
        .route("/bootcamps/:id/reviews", get(reviews::list_for_bootcamp))
        .route("/courses", get(courses::list))
        .route("/courses/:id", get(courses::get))
        .route("/reviews", get(reviews::list))
        .route("/reviews/:id", get(reviews::get))
}

/// Any authenticated account
fn protected_routes(state: &AppState) -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/updatedetails", put(auth::update_details))
        .route("/auth/updatepassword", put(auth::update_password))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn publisher_routes() -> Router<AppState> {
    use handlers::{bootcamps, courses};

    Router::new()
        .route("/bootcamps", post(bootcamps::create))
        .route("/bootcamps/:id", put(bootcamps::update).delete(bootcamps::delete))
        .route("/bootcamps/:id/photo", put(bootcamps::upload_photo))
        .route("/bootcamps/:id/courses", post(courses::create))
        .route("/courses/:id", put(courses::update).delete(courses::delete))
}

fn reviewer_routes() -> Router<AppState> {
    use handlers::reviews;

    Router::new()
        .route("/bootcamps/:id/reviews", post(reviews::create))
        .route("/reviews/:id", put(reviews::update).delete(reviews::delete))
}

fn admin_routes() -> Router<AppState> {
    use handlers::users;

    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route("/users/:id", get(users::get).put(users::update).delete(users::delete))
}

/// JWT first, then the role check
fn gated(state: &AppState, roles: &'static [Role], routes: Router<AppState>) -> Router<AppState> {
    routes
        .route_layer(from_fn_with_state(roles, authorize))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn body_limit(config: &AppConfig) -> usize {
    config
        .api
        .max_request_size_bytes
        .max(config.uploads.max_file_upload + UPLOAD_OVERHEAD_BYTES)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
}
