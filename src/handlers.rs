use crate::{
    error::AppError,
    models::{LoginRequest, LoginResponse, RegisterUserRequest, UserProfile},
    repository::RepositoryState,
    security::{AuthenticationManager, PasswordEncoderState, Principal},
};
use axum::{Json, extract::State, http::StatusCode};

// --- Handlers ---

/// ruta_protegida
///
/// [Authenticated Route] Greets the principal resolved by the security filter.
#[utoipa::path(
    get,
    path = "/ruta_protegida/",
    responses(
        (status = 200, description = "Greeting", body = String, content_type = "text/plain"),
        (status = 401, description = "Missing or invalid credentials")
    ),
    security(("basic_auth" = []))
)]
pub async fn ruta_protegida(principal: Principal) -> String {
    format!("Hola {} esto es una ruta protegida", principal.name())
}

/// register_user
///
/// [Public Route] Creates a user whose password is stored as a bcrypt hash.
#[utoipa::path(
    post,
    path = "/usuarios/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Registered", body = UserProfile),
        (status = 400, description = "Invalid username, or password empty or over 72 bytes"),
        (status = 409, description = "Username already registered")
    )
)]
pub async fn register_user(
    State(repo): State<RepositoryState>,
    State(encoder): State<PasswordEncoderState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let username = payload.username;
    if username.trim().is_empty() {
        return Err(AppError::BadRequest("username must not be empty".to_string()));
    }
    // Stored as sent: login and Basic credentials are matched byte for byte.
    if username.trim() != username {
        return Err(AppError::BadRequest(
            "username must not start or end with whitespace".to_string(),
        ));
    }
    // ':' would make the username unrepresentable in a Basic header.
    if username.contains(':') {
        return Err(AppError::BadRequest("username must not contain ':'".to_string()));
    }
    if payload.password.is_empty() {
        return Err(AppError::BadRequest("password must not be empty".to_string()));
    }

    let password = payload.password;
    let password_hash = tokio::task::spawn_blocking(move || encoder.encode(&password))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task: {}", e)))??;

    let user = repo.create_user(&username, &password_hash).await?;
    tracing::info!(username = %user.username, "user registered");

    Ok((StatusCode::CREATED, Json(UserProfile::from(user))))
}

/// login
///
/// [Public Route] Checks a username/password pair through the authentication
/// manager. Nothing is issued: every later request re-sends Basic credentials.
#[utoipa::path(
    post,
    path = "/usuarios/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials valid", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(auth_manager): State<AuthenticationManager>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let principal = auth_manager
        .authenticate(&payload.username, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        username: principal.name().to_string(),
        authenticated: true,
    }))
}
