// Authentication endpoints. Registration/login are the thin stand-in for an
// external auth provider; everything downstream only sees the AuthUser that
// the JWT middleware injects.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::auth::{generate_jwt, Claims};
use crate::config;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::UserService;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: User,
    pub expires_in: u64,
}

fn session_for(user: User) -> Result<SessionResponse, ApiError> {
    let token = generate_jwt(Claims::new(&user)).map_err(|e| {
        tracing::error!("JWT generation failed: {}", e);
        ApiError::internal_server_error("Failed to create session")
    })?;

    Ok(SessionResponse {
        token,
        user,
        expires_in: config::config().security.jwt_expiry_hours * 3600,
    })
}

/// POST /auth/register - create an account and return a session token
pub async fn register(
    State(pool): State<SqlitePool>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<SessionResponse> {
    let user = UserService::new(pool)
        .register(&req.email, &req.name, &req.password)
        .await?;

    Ok(ApiResponse::created(session_for(user)?))
}

/// POST /auth/login - check credentials and return a session token
pub async fn login(
    State(pool): State<SqlitePool>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<SessionResponse> {
    let user = UserService::new(pool)
        .authenticate(&req.email, &req.password)
        .await?;

    Ok(ApiResponse::success(session_for(user)?))
}

/// GET /auth/whoami - echo the authenticated caller
pub async fn whoami(Extension(caller): Extension<AuthUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "id": caller.user_id,
        "email": caller.email,
        "name": caller.name,
    })))
}

/// DELETE /auth/user - delete the caller's account and everything they own.
/// The cascade is atomic: the caller's projects (with their issues and those
/// issues' comments) and authored comments go; mere participation elsewhere
/// is detached instead.
pub async fn user_delete(
    State(pool): State<SqlitePool>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<()> {
    UserService::new(pool).delete_cascade(caller.user_id).await?;
    Ok(ApiResponse::<()>::no_content())
}
