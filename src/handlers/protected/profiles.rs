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
use crate::database::models::{NewProfile, Profile, ProfileUpdate};
use crate::database::{Page, PageQuery, PageRequest};
use crate::error::ApiError;
use crate::handlers::{non_blank, require};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub academic_program: Option<String>,
    pub graduation_year: Option<i32>,
    pub bio: Option<String>,
    pub linkedin_url: Option<String>,
    pub language_preferences: Option<String>,
    pub cultural_background: Option<String>,
}

impl ProfileRequest {
    fn validate(self) -> Result<NewProfile, ApiError> {
        Ok(NewProfile {
            academic_program: require(self.academic_program, "academic_program")?,
            graduation_year: require(self.graduation_year, "graduation_year")?,
            bio: self.bio,
            linkedin_url: self.linkedin_url,
            language_preferences: self.language_preferences,
            cultural_background: self.cultural_background,
        })
    }

    fn into_update(self) -> Result<ProfileUpdate, ApiError> {
        Ok(ProfileUpdate {
            academic_program: non_blank(self.academic_program, "academic_program")?,
            graduation_year: self.graduation_year,
            bio: self.bio,
            linkedin_url: self.linkedin_url,
            language_preferences: self.language_preferences,
            cultural_background: self.cultural_background,
        })
    }
}

/// GET /profiles (admin)
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Page<Profile>> {
    require_admin(&caller)?;
    let Query(query) = query?;

    let page = PageRequest::from_query(&query, &config::config().api);
    Ok(ApiResponse::success(state.profiles.list(page).await?))
}

/// POST /profiles - the caller's own profile, at most one
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> ApiResult<Profile> {
    let Json(request) = payload?;
    let profile = state.profiles.create(caller.user_id, request.validate()?).await?;
    Ok(ApiResponse::created(profile))
}

/// GET /profiles/:id
pub async fn show(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Profile> {
    let Path(id) = path?;
    Ok(ApiResponse::success(state.profiles.get(id).await?))
}

/// PUT /profiles/:id (owner)
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> ApiResult<Profile> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let update = request.into_update()?;

    let profile = state.profiles.update(id, caller.user_id, update).await?;
    Ok(ApiResponse::success(profile))
}

/// DELETE /profiles/:id (owner)
pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = path?;
    state.profiles.delete(id, caller.user_id).await?;
    Ok(ApiResponse::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn graduation_year_is_required() {
        let request: ProfileRequest =
            serde_json::from_value(json!({ "academic_program": "Physics" })).unwrap();
        let err = request.validate().unwrap_err();
        assert_eq!(err.message(), "Missing required field: graduation_year");
    }

    #[test]
    fn update_keeps_program_non_blank() {
        let request: ProfileRequest =
            serde_json::from_value(json!({ "academic_program": "", "bio": "hi" })).unwrap();
        let err = request.into_update().unwrap_err();
        assert_eq!(err.message(), "Field cannot be blank: academic_program");
    }
}
