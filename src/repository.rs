use crate::{error::AppError, models::UserRecord};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// UserRepository
///
/// The user-details lookup capability consumed by the authentication manager,
/// plus the insert used by registration. Implementations must be shareable
/// across Axum's task boundaries, hence `Send + Sync + async_trait`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns the stored user for `username`, if any.
    async fn load_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, AppError>;

    /// Inserts a new user. Fails with `AppError::Conflict` when the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<UserRecord, AppError>;
}

/// RepositoryState
///
/// The concrete type used to share the user store across the application state.
pub type RepositoryState = Arc<dyn UserRepository>;

fn username_taken(username: &str) -> AppError {
    AppError::Conflict(format!("username '{}' is already registered", username))
}

/// PostgresUserRepository
///
/// `UserRepository` backed by the `usuarios` table.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `usuarios` table when it does not exist yet.
    pub async fn init_schema(&self) -> Result<(), AppError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS usuarios (
                id UUID PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn load_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, AppError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash, created_at FROM usuarios WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<UserRecord, AppError> {
        // A duplicate username inserts nothing and returns no row.
        let inserted = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO usuarios (id, username, password_hash, created_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (username) DO NOTHING
             RETURNING id, username, password_hash, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        inserted.ok_or_else(|| username_taken(username))
    }
}

/// InMemoryUserRepository
///
/// Volatile user store used for local development without a database and in tests.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn load_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, AppError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<UserRecord, AppError> {
        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Err(username_taken(username));
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.insert(record.username.clone(), record.clone());
        Ok(record)
    }
}
