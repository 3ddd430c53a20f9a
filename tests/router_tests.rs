use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use jwt_security::{
    AppConfig, AppState, create_router,
    repository::{InMemoryUserRepository, RepositoryState, UserRepository},
    security::{BasicCredentials, PasswordEncoder},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

// --- Setup ---

fn test_config() -> AppConfig {
    AppConfig {
        bcrypt_cost: 4,
        ..AppConfig::default()
    }
}

/// Router over an in-memory store seeded with alice/wonderland.
async fn test_app() -> Router {
    let repo = Arc::new(InMemoryUserRepository::new()) as RepositoryState;
    let state = AppState::new(test_config(), repo.clone());

    let hash = state.password_encoder.encode("wonderland").unwrap();
    repo.create_user("alice", &hash).await.unwrap();

    create_router(state)
}

fn get(uri: &str, credentials: Option<(&str, &str)>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some((username, password)) = credentials {
        builder = builder.header(
            header::AUTHORIZATION,
            BasicCredentials::new(username, password).to_header_value(),
        );
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn assert_basic_challenge(response: &Response) {
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Basic realm=\"Realm\""
    );
}

// --- Protected Route ---

#[tokio::test]
async fn test_protected_route_greets_authenticated_user() {
    let app = test_app().await;

    let response = app
        .oneshot(get("/ruta_protegida/", Some(("alice", "wonderland"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Hola alice esto es una ruta protegida");
}

#[tokio::test]
async fn test_protected_route_without_credentials_is_401() {
    let app = test_app().await;

    let response = app.oneshot(get("/ruta_protegida/", None)).await.unwrap();

    assert_basic_challenge(&response);
}

#[tokio::test]
async fn test_protected_route_with_wrong_password_is_401() {
    let app = test_app().await;

    let response = app
        .oneshot(get("/ruta_protegida/", Some(("alice", "looking-glass"))))
        .await
        .unwrap();

    assert_basic_challenge(&response);
}

#[tokio::test]
async fn test_protected_route_with_unknown_user_is_401() {
    let app = test_app().await;

    let response = app
        .oneshot(get("/ruta_protegida/", Some(("mallory", "wonderland"))))
        .await
        .unwrap();

    assert_basic_challenge(&response);
}

#[tokio::test]
async fn test_non_basic_authorization_is_401() {
    let app = test_app().await;
    let request = Request::builder()
        .uri("/ruta_protegida/")
        .header(header::AUTHORIZATION, "Bearer some.jwt.token")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_basic_challenge(&response);
}

// --- Catch-all Rule ---

#[tokio::test]
async fn test_unknown_path_without_credentials_is_401_not_404() {
    let app = test_app().await;

    let response = app.oneshot(get("/does/not/exist", None)).await.unwrap();

    assert_basic_challenge(&response);
}

#[tokio::test]
async fn test_unknown_path_with_credentials_reaches_router() {
    let app = test_app().await;

    let response = app
        .oneshot(get("/does/not/exist", Some(("alice", "wonderland"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_document_requires_credentials() {
    let app = test_app().await;

    let anonymous = app
        .clone()
        .oneshot(get("/api-docs/openapi.json", None))
        .await
        .unwrap();
    assert_basic_challenge(&anonymous);

    let authenticated = app
        .oneshot(get("/api-docs/openapi.json", Some(("alice", "wonderland"))))
        .await
        .unwrap();
    assert_eq!(authenticated.status(), StatusCode::OK);
    let doc: Value = serde_json::from_str(&body_string(authenticated).await).unwrap();
    assert!(doc["paths"]["/ruta_protegida/"].is_object());
}

// --- Public Routes ---

#[tokio::test]
async fn test_register_is_public_and_needs_no_csrf_token() {
    let app = test_app().await;

    let response = app
        .oneshot(post_json(
            "/usuarios/register",
            json!({ "username": "bob", "password": "builder" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let profile: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(profile["username"], "bob");
    assert!(profile.get("password_hash").is_none());
}

#[tokio::test]
async fn test_public_route_ignores_invalid_credentials() {
    let app = test_app().await;
    let mut request = post_json(
        "/usuarios/login",
        json!({ "username": "alice", "password": "wonderland" }),
    );
    request.headers_mut().insert(
        header::AUTHORIZATION,
        BasicCredentials::new("mallory", "wrong")
            .to_header_value()
            .parse()
            .unwrap(),
    );

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body, json!({ "username": "alice", "authenticated": true }));
}

#[tokio::test]
async fn test_login_with_bad_credentials_is_401() {
    let app = test_app().await;

    let response = app
        .oneshot(post_json(
            "/usuarios/login",
            json!({ "username": "alice", "password": "nope" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registered_user_can_access_protected_route() {
    let app = test_app().await;

    let registered = app
        .clone()
        .oneshot(post_json(
            "/usuarios/register",
            json!({ "username": "carol", "password": "s3cr3t:with:colons" }),
        ))
        .await
        .unwrap();
    assert_eq!(registered.status(), StatusCode::CREATED);

    let response = app
        .oneshot(get("/ruta_protegida/", Some(("carol", "s3cr3t:with:colons"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Hola carol esto es una ruta protegida");
}

// --- Stateless Session Policy ---

#[tokio::test]
async fn test_each_request_must_carry_credentials() {
    let app = test_app().await;

    let first = app
        .clone()
        .oneshot(get("/ruta_protegida/", Some(("alice", "wonderland"))))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert!(first.headers().get(header::SET_COOKIE).is_none());

    let second = app.oneshot(get("/ruta_protegida/", None)).await.unwrap();
    assert_basic_challenge(&second);
    assert!(second.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = test_app().await;

    let response = app.oneshot(get("/ruta_protegida/", None)).await.unwrap();

    assert!(response.headers().get("x-request-id").is_some());
}
