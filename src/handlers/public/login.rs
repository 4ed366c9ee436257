use axum::{extract::{rejection::JsonRejection, State}, Json};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::issue_token;
use crate::config;
use crate::database::models::User;
use crate::error::ApiError;
use crate::handlers::require;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: User,
}

/// POST /auth/login - exchange credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;
    let username = require(request.username, "username")?;
    let password = require(request.password, "password")?;

    let user = state
        .users
        .authenticate(&username, &password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    let (token, expires_in) =
        issue_token(&config::config().security, user.id, &user.username, user.role)?;

    tracing::info!(user = %user.id, "login succeeded");
    Ok(ApiResponse::success(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in,
        user,
    }))
}
