use sqlx::PgPool;
use uuid::Uuid;

use super::ServiceError;
use crate::database::models::profile::PROFILE_COLUMNS;
use crate::database::models::{NewProfile, Profile, ProfileUpdate};
use crate::database::{DatabaseError, Page, PageRequest};

#[derive(Clone)]
pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<Profile>, ServiceError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_profiles")
            .fetch_one(&self.pool)
            .await?;

        let sql = format!("SELECT {PROFILE_COLUMNS} FROM user_profiles ORDER BY id LIMIT $1 OFFSET $2");
        let items = sqlx::query_as::<_, Profile>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(items, page, total))
    }

    pub async fn get(&self, id: Uuid) -> Result<Profile, ServiceError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Profile {id} not found")).into())
    }

    /// Create the profile of `user_id`; each user has at most one
    pub async fn create(&self, user_id: Uuid, new_profile: NewProfile) -> Result<Profile, ServiceError> {
        let sql = format!(
            "INSERT INTO user_profiles (id, user_id, academic_program, graduation_year, bio, \
             linkedin_url, language_preferences, cultural_background) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {PROFILE_COLUMNS}"
        );
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&new_profile.academic_program)
            .bind(new_profile.graduation_year)
            .bind(&new_profile.bio)
            .bind(&new_profile.linkedin_url)
            .bind(&new_profile.language_preferences)
            .bind(&new_profile.cultural_background)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                    DatabaseError::NotFound(format!("User {user_id} not found"))
                }
                e => DatabaseError::from_unique(e, "Profile already exists"),
            })?;

        Ok(profile)
    }

    /// Apply an update on behalf of `owner`. Profiles of other users are refused.
    pub async fn update(&self, id: Uuid, owner: Uuid, update: ProfileUpdate) -> Result<Profile, ServiceError> {
        let sql = format!(
            "UPDATE user_profiles SET \
               academic_program = COALESCE($3, academic_program), \
               graduation_year = COALESCE($4, graduation_year), \
               bio = COALESCE($5, bio), \
               linkedin_url = COALESCE($6, linkedin_url), \
               language_preferences = COALESCE($7, language_preferences), \
               cultural_background = COALESCE($8, cultural_background) \
             WHERE id = $1 AND user_id = $2 RETURNING {PROFILE_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(owner)
            .bind(&update.academic_program)
            .bind(update.graduation_year)
            .bind(&update.bio)
            .bind(&update.linkedin_url)
            .bind(&update.language_preferences)
            .bind(&update.cultural_background)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(profile) => Ok(profile),
            None => Err(self.missing_or_foreign(id).await),
        }
    }

    pub async fn delete(&self, id: Uuid, owner: Uuid) -> Result<(), ServiceError> {
        let result = sqlx::query("DELETE FROM user_profiles WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(self.missing_or_foreign(id).await);
        }
        Ok(())
    }

    /// Explain why an owner-scoped write touched no rows
    async fn missing_or_foreign(&self, id: Uuid) -> ServiceError {
        match self.get(id).await {
            Ok(_) => ServiceError::Forbidden("Profile belongs to another user".into()),
            Err(e) => e,
        }
    }
}
