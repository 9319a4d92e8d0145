// handlers/root.rs - GET / and GET /health

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::state::AppState;

/// GET / - Service info and route map
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "DevCamper API",
            "version": env!("CARGO_PKG_VERSION"),
            "environment": state.config.environment,
            "endpoints": {
                "auth": "/api/v1/auth/* (register, login public; me, updatedetails, updatepassword protected)",
                "bootcamps": "/api/v1/bootcamps[/:id] (read public; write publisher/admin)",
                "courses": "/api/v1/courses[/:id], /api/v1/bootcamps/:id/courses",
                "reviews": "/api/v1/reviews[/:id], /api/v1/bootcamps/:id/reviews",
                "users": "/api/v1/users[/:id] (admin)",
                "uploads": "/uploads/*",
            }
        }
    }))
}

/// GET /health - Database ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "Database unavailable",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}
