use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Account role as stored in `users.role` and carried in the token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(AuthError::UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, username: impl Into<String>, role: Role, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            username: username.into(),
            role,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

/// Sign a token for the given user. Returns the token and its lifetime in seconds.
pub fn issue_token(
    security: &SecurityConfig,
    user_id: Uuid,
    username: &str,
    role: Role,
) -> Result<(String, i64), AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let claims = Claims::new(user_id, username, role, security.jwt_expiry_hours);
    let expires_in = claims.exp - claims.iat;
    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());

    let token = encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))?;

    Ok((token, expires_in))
}

/// Verify signature and expiry, returning the claims
pub fn decode_token(security: &SecurityConfig, token: &str) -> Result<Claims, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, cost)?)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    Ok(bcrypt::verify(password, hash)?)
}

/// Verified identity of the caller, injected by the JWT middleware
#[derive(Clone, Debug)]
pub struct Caller {
    pub user_id: Uuid,
    pub username: String,
    pub is_admin: bool,
}

impl From<Claims> for Caller {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            is_admin: claims.role == Role::Admin,
        }
    }
}

impl Caller {
    /// Admin capability, available only when the token carried the admin role
    pub fn admin(&self) -> Option<Admin> {
        self.is_admin.then(|| Admin { user_id: self.user_id })
    }

    /// True when the caller is `user_id` or holds the admin role
    pub fn can_act_for(&self, user_id: Uuid) -> bool {
        self.is_admin || self.user_id == user_id
    }
}

/// Proof that the admin gate was passed. Only `Caller::admin` constructs it.
#[derive(Clone, Copy, Debug)]
pub struct Admin {
    user_id: Uuid,
}

impl Admin {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }
}
