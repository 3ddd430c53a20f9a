use crate::{AppState, handlers};
use axum::{Router, routing::post};

/// Public Router Module
///
/// Endpoints reachable without credentials. Any `Authorization` header sent to
/// them is ignored by the security filter.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // POST /usuarios/register
        // Creates a user with a bcrypt-hashed password.
        .route("/usuarios/register", post(handlers::register_user))
        // POST /usuarios/login
        // Verifies a username/password pair. No token or session is issued.
        .route("/usuarios/login", post(handlers::login))
}
