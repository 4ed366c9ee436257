use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::auth::Caller;
use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /auth/me - the caller's own user record, balance included
pub async fn me(State(state): State<AppState>, Extension(caller): Extension<Caller>) -> ApiResult<User> {
    let user = state.users.get(caller.user_id).await?;
    Ok(ApiResponse::success(user))
}
