use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    error::AppError,
    security::{
        authentication::AuthenticationManager,
        credentials::BasicCredentials,
        policy::{Access, SecurityPolicy},
    },
};

/// security_filter
///
/// The single middleware in front of every route. Looks up the access the
/// policy requires for the request path:
/// - `Public`: the request goes straight to the handler, whatever its headers.
/// - `Authenticated`: Basic credentials are verified on this request alone
///   (nothing is remembered between requests), and the resolved `Principal` is
///   inserted into the request extensions before the handler runs. Failure
///   returns 401 with a Basic challenge; the handler never executes.
pub async fn security_filter(
    State(policy): State<Arc<SecurityPolicy>>,
    State(auth_manager): State<AuthenticationManager>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();

    if policy.required_access(&path) == Access::Public {
        tracing::debug!(%path, "public route, skipping authentication");
        return next.run(request).await;
    }

    let Some(credentials) = BasicCredentials::from_headers(request.headers()) else {
        tracing::warn!(%path, "rejected: missing or malformed basic credentials");
        return auth_manager.unauthorized().into_response();
    };

    match auth_manager
        .authenticate(&credentials.username, &credentials.password)
        .await
    {
        Ok(principal) => {
            tracing::debug!(%path, principal = principal.name(), "request authenticated");
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(err @ AppError::Unauthorized { .. }) => {
            tracing::warn!(%path, username = %credentials.username, "rejected: bad credentials");
            err.into_response()
        }
        Err(err) => err.into_response(),
    }
}
