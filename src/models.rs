use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Stored Records ---

/// UserRecord
///
/// A row of the `usuarios` table. Holds the bcrypt hash, so it is never
/// serialized into a response; use `UserProfile` for that.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    // Unique login name. Becomes the principal name once authenticated.
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads ---

/// RegisterUserRequest
///
/// Input payload for `POST /usuarios/register`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    pub username: String,
    pub password: String,
}

/// LoginRequest
///
/// Input payload for `POST /usuarios/login`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// --- Response Payloads ---

/// UserProfile
///
/// Public view of a user, returned after registration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserProfile {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub username: String,
    pub authenticated: bool,
}
