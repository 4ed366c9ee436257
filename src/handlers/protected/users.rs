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
use crate::auth::{Caller, Role};
use crate::config;
use crate::database::models::{NewUser, User, UserUpdate};
use crate::database::{Page, PageQuery, PageRequest};
use crate::error::ApiError;
use crate::handlers::{non_blank, require};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub campus_affiliation: Option<String>,
}

impl CreateUserRequest {
    fn validate(self) -> Result<NewUser, ApiError> {
        Ok(NewUser {
            username: require(self.username, "username")?,
            email: require(self.email, "email")?,
            password: require(self.password, "password")?,
            first_name: require(self.first_name, "first_name")?,
            last_name: require(self.last_name, "last_name")?,
            phone_number: require(self.phone_number, "phone_number")?,
            campus_affiliation: require(self.campus_affiliation, "campus_affiliation")?,
        })
    }
}

/// Fields a user may change on their own record. Unknown fields such as
/// `token_balance` or `role` are ignored.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub campus_affiliation: Option<String>,
}

impl UpdateUserRequest {
    fn validate(self) -> Result<UserUpdate, ApiError> {
        Ok(UserUpdate {
            username: non_blank(self.username, "username")?,
            email: non_blank(self.email, "email")?,
            password: non_blank(self.password, "password")?,
            first_name: non_blank(self.first_name, "first_name")?,
            last_name: non_blank(self.last_name, "last_name")?,
            phone_number: non_blank(self.phone_number, "phone_number")?,
            campus_affiliation: non_blank(self.campus_affiliation, "campus_affiliation")?,
        })
    }
}

/// GET /users - paginated list (admin)
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Page<User>> {
    require_admin(&caller)?;
    let Query(query) = query?;

    let page = PageRequest::from_query(&query, &config::config().api);
    Ok(ApiResponse::success(state.users.list(page).await?))
}

/// POST /users - register a user with a zero balance (admin)
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<User> {
    require_admin(&caller)?;
    let Json(request) = payload?;

    let user = state.users.create(request.validate()?, Role::User).await?;
    Ok(ApiResponse::created(user))
}

/// GET /users/:id
pub async fn show(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<User> {
    let Path(id) = path?;
    Ok(ApiResponse::success(state.users.get(id).await?))
}

/// PUT /users/:id - self or admin
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Path(id) = path?;
    if !caller.can_act_for(id) {
        return Err(ApiError::forbidden("You can only update your own account"));
    }
    let Json(request) = payload?;
    let update = request.validate()?;

    let user = state.users.update(id, update).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /users/:id - admin; removes profile and ledger entries too
pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<()> {
    require_admin(&caller)?;
    let Path(id) = path?;

    state.users.delete(id).await?;
    Ok(ApiResponse::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_reports_first_missing_field() {
        let request: CreateUserRequest = serde_json::from_value(json!({
            "username": "ada",
            "email": "ada@campus.edu",
            "password": "secret",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "campus_affiliation": "Mathematics"
        }))
        .unwrap();

        let err = request.validate().unwrap_err();
        assert_eq!(err.message(), "Missing required field: phone_number");
    }

    #[test]
    fn update_ignores_balance_and_role() {
        let request: UpdateUserRequest = serde_json::from_value(json!({
            "first_name": "Grace",
            "token_balance": 1_000_000,
            "role": "ADMIN"
        }))
        .unwrap();

        let update = request.validate().unwrap();
        assert_eq!(update.first_name.as_deref(), Some("Grace"));
        assert!(update.username.is_none() && update.password.is_none());
    }

    #[test]
    fn update_rejects_blank_identity_fields() {
        for field in ["username", "email", "password"] {
            let mut body = serde_json::Map::new();
            body.insert(field.to_string(), json!("  "));
            let request: UpdateUserRequest =
                serde_json::from_value(serde_json::Value::Object(body)).unwrap();
            let err = request.validate().unwrap_err();
            assert_eq!(err.message(), format!("Field cannot be blank: {field}"));
        }
    }
}
