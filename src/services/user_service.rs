use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::ServiceError;
use crate::auth::{self, Role};
use crate::database::models::user::USER_COLUMNS;
use crate::database::models::{NewUser, User, UserRow, UserUpdate};
use crate::database::{DatabaseError, Page, PageRequest};

/// Registration, lookup and maintenance of user accounts. The token balance
/// is owned by the ledger and never written here.
#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(pool: PgPool, bcrypt_cost: u32) -> Self {
        Self { pool, bcrypt_cost }
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<User>, ServiceError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id LIMIT $1 OFFSET $2");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total))
    }

    pub async fn get(&self, id: Uuid) -> Result<User, ServiceError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User {id} not found")))?;

        Ok(User::try_from(row)?)
    }

    /// Check a username/password pair. Unknown users and wrong passwords are
    /// indistinguishable to the caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>, ServiceError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let Some(row) = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let password = password.to_string();
        let hash = row.password_hash.clone();
        let matches =
            tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash)).await??;

        if matches {
            Ok(Some(User::try_from(row)?))
        } else {
            Ok(None)
        }
    }

    /// Register a user with a zero balance
    pub async fn create(&self, new_user: NewUser, role: Role) -> Result<User, ServiceError> {
        let password_hash = self.hash(new_user.password.clone()).await?;

        let mut tx = self.pool.begin().await?;
        Self::ensure_unique(&mut tx, None, Some(&new_user.username), Some(&new_user.email)).await?;

        let sql = format!(
            "INSERT INTO users (id, username, email, password_hash, first_name, last_name, \
             phone_number, campus_affiliation, role, token_balance) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&password_hash)
            .bind(&new_user.first_name)
            .bind(&new_user.last_name)
            .bind(&new_user.phone_number)
            .bind(&new_user.campus_affiliation)
            .bind(role.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| DatabaseError::from_unique(e, "Username or email already exists"))?;

        tx.commit().await?;
        tracing::info!(user = %row.id, username = %row.username, role = %role, "user created");
        Ok(User::try_from(row)?)
    }

    pub async fn update(&self, id: Uuid, update: UserUpdate) -> Result<User, ServiceError> {
        if update.is_empty() {
            return self.get(id).await;
        }
        let password_hash = match update.password.clone() {
            Some(password) => Some(self.hash(password).await?),
            None => None,
        };

        let mut tx = self.pool.begin().await?;
        let current: Option<(String, String)> =
            sqlx::query_as("SELECT username, email FROM users WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let (username, email) =
            current.ok_or_else(|| DatabaseError::NotFound(format!("User {id} not found")))?;

        let new_username = update.username.as_deref().filter(|u| *u != username);
        let new_email = update.email.as_deref().filter(|e| *e != email);
        Self::ensure_unique(&mut tx, Some(id), new_username, new_email).await?;

        let sql = format!(
            "UPDATE users SET \
               username = COALESCE($2, username), \
               email = COALESCE($3, email), \
               password_hash = COALESCE($4, password_hash), \
               first_name = COALESCE($5, first_name), \
               last_name = COALESCE($6, last_name), \
               phone_number = COALESCE($7, phone_number), \
               campus_affiliation = COALESCE($8, campus_affiliation), \
               updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(&update.username)
            .bind(&update.email)
            .bind(&password_hash)
            .bind(&update.first_name)
            .bind(&update.last_name)
            .bind(&update.phone_number)
            .bind(&update.campus_affiliation)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| DatabaseError::from_unique(e, "Username or email already exists"))?;

        tx.commit().await?;
        Ok(User::try_from(row)?)
    }

    /// Remove a user together with its profile and ledger entries
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("User {id} not found")).into());
        }
        tracing::info!(user = %id, "user deleted");
        Ok(())
    }

    async fn ensure_unique(
        tx: &mut Transaction<'static, Postgres>,
        except: Option<Uuid>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<(), ServiceError> {
        if let Some(username) = username {
            if Self::taken(tx, "username", username, except).await? {
                return Err(DatabaseError::Conflict("Username already exists".into()).into());
            }
        }
        if let Some(email) = email {
            if Self::taken(tx, "email", email, except).await? {
                return Err(DatabaseError::Conflict("Email already exists".into()).into());
            }
        }
        Ok(())
    }

    async fn taken(
        tx: &mut Transaction<'static, Postgres>,
        column: &'static str,
        value: &str,
        except: Option<Uuid>,
    ) -> Result<bool, ServiceError> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM users WHERE {column} = $1 AND ($2::uuid IS NULL OR id <> $2))"
        );
        let (exists,): (bool,) = sqlx::query_as(&sql)
            .bind(value)
            .bind(except)
            .fetch_one(&mut **tx)
            .await?;
        Ok(exists)
    }

    async fn hash(&self, password: String) -> Result<String, ServiceError> {
        let cost = self.bcrypt_cost;
        Ok(tokio::task::spawn_blocking(move || auth::hash_password(&password, cost)).await??)
    }
}
