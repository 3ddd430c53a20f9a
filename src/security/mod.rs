//! Security configuration.
//!
//! Builds the pieces the rest of the service is wired with: the ordered route
//! policy, the password encoder and the authentication manager. The policy is
//! stateless HTTP Basic: no session is created or read, no cookie is set, and
//! no CSRF token is issued or checked on any method.

use std::sync::Arc;

use crate::{config::AppConfig, repository::RepositoryState};

pub mod authentication;
pub mod credentials;
pub mod filter;
pub mod password;
pub mod policy;

pub use authentication::{AuthenticationManager, Principal};
pub use credentials::BasicCredentials;
pub use filter::security_filter;
pub use password::{BcryptPasswordEncoder, PasswordEncoder, PasswordEncoderState};
pub use policy::{Access, PathPattern, RouteRule, SecurityPolicy};

/// The service's route policy: login and registration are open, the protected
/// route and everything else require credentials.
pub fn security_filter_chain() -> SecurityPolicy {
    SecurityPolicy::new()
        .permit_all(["/usuarios/login", "/usuarios/register"])
        .authenticated(["/ruta_protegida/**"])
        .any_request(Access::Authenticated)
}

pub fn password_encoder(config: &AppConfig) -> PasswordEncoderState {
    Arc::new(BcryptPasswordEncoder::new(config.bcrypt_cost))
}

pub fn authentication_manager(
    config: &AppConfig,
    users: RepositoryState,
    encoder: PasswordEncoderState,
) -> AuthenticationManager {
    AuthenticationManager::new(users, encoder, config.realm.clone())
}
