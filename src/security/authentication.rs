use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};

use crate::{error::AppError, repository::RepositoryState, security::password::PasswordEncoderState};

/// Principal
///
/// The authenticated identity of a request. Attached to the request extensions
/// by the security filter and read by handlers as an extractor argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    username: String,
}

impl Principal {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.username
    }
}

/// Principal Extractor Implementation
///
/// Only reads what the security filter attached; no credential check happens
/// here. A handler asking for a Principal on a route the policy leaves public
/// is a wiring bug, so the rejection is a 500 rather than a 401.
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Principal>().cloned().ok_or_else(|| {
            tracing::error!(
                path = %parts.uri.path(),
                "no principal attached; route is not covered by an authenticated rule"
            );
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }
}

/// Password hashed once per manager so that unknown usernames still pay a
/// full bcrypt verification.
const DUMMY_PASSWORD: &str = "unknown-user-timing-equalizer";

/// AuthenticationManager
///
/// Resolves a username/password pair into a Principal: user lookup, then
/// password verification. Unknown users and wrong passwords produce the same
/// `Unauthorized` error after the same amount of bcrypt work, so response
/// timing does not reveal which usernames exist.
#[derive(Clone)]
pub struct AuthenticationManager {
    users: RepositoryState,
    encoder: PasswordEncoderState,
    realm: String,
    // Hash of DUMMY_PASSWORD at the encoder's cost, verified against for unknown users.
    dummy_hash: Arc<str>,
}

impl AuthenticationManager {
    pub fn new(users: RepositoryState, encoder: PasswordEncoderState, realm: impl Into<String>) -> Self {
        let dummy_hash = encoder.encode(DUMMY_PASSWORD).unwrap_or_else(|e| {
            tracing::error!("failed to prepare the unknown-user hash: {}", e);
            String::new()
        });

        Self {
            users,
            encoder,
            realm: realm.into(),
            dummy_hash: Arc::from(dummy_hash),
        }
    }

    pub fn unauthorized(&self) -> AppError {
        AppError::unauthorized(self.realm.clone())
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AppError> {
        let user = self.users.load_user_by_username(username).await?;

        let stored_hash: Arc<str> = match &user {
            Some(user) => Arc::from(user.password_hash.as_str()),
            None => self.dummy_hash.clone(),
        };

        // bcrypt is deliberately slow; keep it off the async workers.
        let encoder = self.encoder.clone();
        let raw = password.to_owned();
        let matches = tokio::task::spawn_blocking(move || encoder.matches(&raw, &stored_hash))
            .await
            .map_err(|e| AppError::Internal(format!("password verification task: {}", e)))?;

        match user {
            Some(user) if matches => Ok(Principal::new(user.username)),
            Some(_) => {
                tracing::debug!(username, "authentication failed: bad password");
                Err(self.unauthorized())
            }
            None => {
                tracing::debug!(username, "authentication failed: unknown user");
                Err(self.unauthorized())
            }
        }
    }
}
