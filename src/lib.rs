use axum::{
    extract::FromRef,
    http::HeaderName,
    Router,
    middleware,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod security;

// Routers grouped by the access the policy grants them (Public, Authenticated).
pub mod routes;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::AppError;
pub use repository::{InMemoryUserRepository, PostgresUserRepository, RepositoryState};
pub use security::{AuthenticationManager, PasswordEncoderState, Principal, SecurityPolicy};

/// ApiDoc
///
/// OpenAPI document for the service, served at `/api-docs/openapi.json`.
/// Like every path outside the public rules, it requires credentials.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::ruta_protegida, handlers::register_user, handlers::login),
    components(
        schemas(
            models::RegisterUserRequest, models::LoginRequest,
            models::LoginResponse, models::UserProfile,
        )
    ),
    modifiers(&BasicAuthScheme),
    tags(
        (name = "jwt-security", description = "Stateless HTTP Basic security demo")
    )
)]
struct ApiDoc;

/// Registers the `basic_auth` scheme referenced by authenticated paths.
struct BasicAuthScheme;

impl Modify for BasicAuthScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
        }
    }
}

/// AppState
///
/// Single, immutable container holding every capability the service is wired
/// with. Constructed explicitly at startup; handlers and the security filter
/// pull the parts they need through FromRef.
#[derive(Clone)]
pub struct AppState {
    /// User store consulted for authentication and written by registration.
    pub repo: RepositoryState,
    /// Ordered route rules evaluated by the security filter.
    pub policy: Arc<SecurityPolicy>,
    /// bcrypt encoder shared by registration and the authentication manager.
    pub password_encoder: PasswordEncoderState,
    pub auth_manager: AuthenticationManager,
    pub config: AppConfig,
}

impl AppState {
    /// Wires the security components from the configuration and a user store.
    pub fn new(config: AppConfig, repo: RepositoryState) -> Self {
        let password_encoder = security::password_encoder(&config);
        let auth_manager =
            security::authentication_manager(&config, repo.clone(), password_encoder.clone());

        Self {
            repo,
            policy: Arc::new(security::security_filter_chain()),
            password_encoder,
            auth_manager,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for Arc<SecurityPolicy> {
    fn from_ref(app_state: &AppState) -> Arc<SecurityPolicy> {
        app_state.policy.clone()
    }
}

impl FromRef<AppState> for PasswordEncoderState {
    fn from_ref(app_state: &AppState) -> PasswordEncoderState {
        app_state.password_encoder.clone()
    }
}

impl FromRef<AppState> for AuthenticationManager {
    fn from_ref(app_state: &AppState) -> AuthenticationManager {
        app_state.auth_manager.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routes, puts the security filter in front of all of them
/// (including the 404 fallback, so unknown paths answer 401 to anonymous
/// callers) and adds the observability layers around it.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(authenticated::authenticated_routes())
        // `layer` rather than `route_layer`: the fallback must be covered too.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security::security_filter,
        ))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: method, uri and the `x-request-id` set by
/// the request id layer, so every log line of a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
