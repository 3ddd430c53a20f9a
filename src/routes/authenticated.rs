use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Every handler here takes a `Principal`, which the security filter attaches
/// after verifying the request's Basic credentials.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /ruta_protegida/
        // Greets the authenticated user by name.
        .route("/ruta_protegida/", get(handlers::ruta_protegida))
}
