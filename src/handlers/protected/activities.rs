use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::require_admin;
use crate::app::AppState;
use crate::auth::Caller;
use crate::config;
use crate::database::{Page, PageQuery, PageRequest};
use crate::error::ApiError;
use crate::handlers::require;
use crate::ledger::LedgerEntry;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct CreateActivityRequest {
    pub user_id: Option<Uuid>,
    pub activity_type: Option<String>,
    pub amount: Option<i64>,
    pub description: Option<String>,
}

/// GET /activities - the caller's own ledger, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Page<LedgerEntry>> {
    let Query(query) = query?;
    let page = PageRequest::from_query(&query, &config::config().api);

    let entries = state.ledger.list_entries(caller.user_id, page).await?;
    Ok(ApiResponse::success(entries))
}

/// GET /activities/:id - only entries on the caller's own account
pub async fn show(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<LedgerEntry> {
    let Path(id) = path?;
    let entry = state.ledger.find_entry(caller.user_id, id).await?;
    Ok(ApiResponse::success(entry))
}

/// POST /activities - credit or debit a user's balance (admin)
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<CreateActivityRequest>, JsonRejection>,
) -> ApiResult<LedgerEntry> {
    let admin = require_admin(&caller)?;
    let Json(request) = payload?;

    let user_id = require(request.user_id, "user_id")?;
    let activity_type = require(request.activity_type, "activity_type")?;
    let amount = require(request.amount, "amount")?;
    // Present but possibly empty
    let description = request
        .description
        .ok_or_else(|| ApiError::missing_field("description"))?;

    let entry = state
        .ledger
        .apply_entry(&admin, user_id, &activity_type, amount, description)
        .await?;
    Ok(ApiResponse::created(entry))
}

/// DELETE /activities/:id - reverse an entry (admin)
pub async fn reverse(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<()> {
    let admin = require_admin(&caller)?;
    let Path(id) = path?;

    state.ledger.reverse_entry(&admin, id).await?;
    Ok(ApiResponse::no_content())
}
