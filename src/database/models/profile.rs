use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const PROFILE_COLUMNS: &str = "id, user_id, academic_program, graduation_year, bio, \
     linkedin_url, language_preferences, cultural_background";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub academic_program: String,
    pub graduation_year: i32,
    pub bio: Option<String>,
    pub linkedin_url: Option<String>,
    pub language_preferences: Option<String>,
    pub cultural_background: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub academic_program: String,
    pub graduation_year: i32,
    pub bio: Option<String>,
    pub linkedin_url: Option<String>,
    pub language_preferences: Option<String>,
    pub cultural_background: Option<String>,
}

/// Allow-listed profile update; `user_id` is fixed at creation
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub academic_program: Option<String>,
    pub graduation_year: Option<i32>,
    pub bio: Option<String>,
    pub linkedin_url: Option<String>,
    pub language_preferences: Option<String>,
    pub cultural_background: Option<String>,
}
