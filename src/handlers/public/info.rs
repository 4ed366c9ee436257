use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::app::AppState;
use crate::database::DatabaseManager;

/// GET / - service description and endpoint summary
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": {
            "name": "Campus Token API",
            "version": env!("CARGO_PKG_VERSION"),
            "status": "operational",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "login": "POST /auth/login (public)",
                "me": "GET /auth/me (protected)",
                "users": "/users[/:id] (protected, admin for list/create/delete)",
                "profiles": "/profiles[/:id] (protected, owner for update/delete)",
                "activities": "/activities[/:id] (protected, admin for create/reverse)"
            }
        }
    }))
}

/// GET /health - liveness plus database reachability
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": "unreachable"
                    }
                })),
            )
        }
    }
}
