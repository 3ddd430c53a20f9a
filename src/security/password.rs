use std::sync::Arc;

use crate::{config::DEFAULT_BCRYPT_COST, error::AppError};

/// bcrypt only reads this many bytes of input; longer passwords are refused
/// instead of being silently truncated.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// PasswordEncoder
///
/// One-way password hashing used to store credentials at registration and to
/// verify them at authentication time.
pub trait PasswordEncoder: Send + Sync {
    /// Hashes `raw` with a fresh salt. Passwords the algorithm cannot represent
    /// in full are rejected with `AppError::BadRequest`.
    fn encode(&self, raw: &str) -> Result<String, AppError>;

    /// True when `raw` hashes to `encoded`. A malformed `encoded` value never matches.
    fn matches(&self, raw: &str, encoded: &str) -> bool;
}

/// PasswordEncoderState
///
/// Shared handle to the encoder, held in the application state.
pub type PasswordEncoderState = Arc<dyn PasswordEncoder>;

/// BcryptPasswordEncoder
///
/// Salted, adaptive-cost hashing. The work factor is fixed at construction;
/// hashes produced with another cost still verify because bcrypt embeds it.
#[derive(Debug, Clone)]
pub struct BcryptPasswordEncoder {
    cost: u32,
}

impl BcryptPasswordEncoder {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptPasswordEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

impl PasswordEncoder for BcryptPasswordEncoder {
    fn encode(&self, raw: &str) -> Result<String, AppError> {
        if raw.len() > MAX_PASSWORD_BYTES {
            return Err(AppError::BadRequest(format!(
                "password must not exceed {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }
        bcrypt::hash(raw, self.cost).map_err(|e| AppError::Internal(format!("bcrypt: {}", e)))
    }

    fn matches(&self, raw: &str, encoded: &str) -> bool {
        // No stored hash can come from a longer password.
        if raw.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        match bcrypt::verify(raw, encoded) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!("stored password does not look like a bcrypt hash: {}", e);
                false
            }
        }
    }
}
