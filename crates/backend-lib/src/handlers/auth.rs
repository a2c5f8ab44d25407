// ============================
// crates/backend-lib/src/handlers/auth.rs
// ============================
//! JSON handlers for the credential operations.
use crate::{error::AppError, AppState};
use axum::{extract::State, Json};
use blogauth_common::{
    AuthResponse, AuthUserRequest, AuthUserResponse, EmailUsedRequest, LoginRequest,
    SignupRequest, UsedResponse, UsernameUsedRequest,
};
use std::sync::Arc;

/// `POST /auth/signup`
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let token = state
        .auth
        .signup(&req.username, &req.email, &req.password)
        .await?;
    Ok(Json(AuthResponse {
        token: token.into_string(),
    }))
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let token = state.auth.login(&req.login, &req.password).await?;
    Ok(Json(AuthResponse {
        token: token.into_string(),
    }))
}

/// `POST /auth/username-used`
pub async fn username_used(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UsernameUsedRequest>,
) -> Result<Json<UsedResponse>, AppError> {
    let available = state.auth.username_available(&req.username).await?;
    Ok(Json(UsedResponse { used: !available }))
}

/// `POST /auth/email-used`
pub async fn email_used(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmailUsedRequest>,
) -> Result<Json<UsedResponse>, AppError> {
    let available = state.auth.email_available(&req.email).await?;
    Ok(Json(UsedResponse { used: !available }))
}

/// `POST /auth/auth-user`
pub async fn auth_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AuthUserRequest>,
) -> Result<Json<AuthUserResponse>, AppError> {
    let claims = state.auth.authenticate_token(&req.token).await?;
    Ok(Json(claims.into()))
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}
