//! Authentication routes: register, login, me.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use docshare_core::User;
use docshare_store::NewUser;
use serde::{Deserialize, Serialize};

use crate::auth::{self, AuthenticatedUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Shortest accepted password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    pub expires_in_hours: u64,
}

fn validate_registration(request: &RegisterRequest) -> ApiResult<()> {
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name is required".to_string()));
    }
    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::BadRequest("a valid email is required".to_string()));
    }
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/auth/register
///
/// # Response
/// - 201 Created with the new user
/// - 400 Bad Request if a field is missing or too short
/// - 409 Conflict if the email is already registered
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    validate_registration(&request)?;

    let password_hash = auth::hash_password(&request.password)?;
    let user = state
        .store()
        .insert_user(&NewUser {
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/auth/login
///
/// Unknown email and wrong password get the same 401.
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let account = state
        .store()
        .find_account_by_email(request.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !auth::verify_password(&request.password, &account.password_hash)? {
        return Err(invalid());
    }

    let config = state.config();
    let token = auth::create_token(&account.user, &config.jwt_secret, config.jwt_expiry_hours)?;

    tracing::info!(user_id = %account.user.id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: account.user,
        expires_in_hours: config.jwt_expiry_hours,
    }))
}

/// GET /api/auth/me - current user info.
async fn me(user: AuthenticatedUser) -> Json<User> {
    Json(user.user)
}

/// Build auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}
