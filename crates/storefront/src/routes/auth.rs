//! Authentication routes.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember: bool,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: Option<CurrentUser>,
}

async fn establish_session(session: &Session, user: &CurrentUser) -> Result<()> {
    set_current_user(session, user)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    set_sentry_user(&user.uid, Some(user.email.as_str()));
    Ok(())
}

/// POST /auth/signup - register a new account and sign it in.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<CurrentUser>)> {
    let user = state
        .accounts()
        .sign_up(
            &request.username,
            &request.email,
            &request.password,
            &request.confirm_password,
        )
        .await?;

    establish_session(&session, &user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /auth/login - email/password sign-in.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<CurrentUser>> {
    let user = state
        .accounts()
        .sign_in(&request.email, &request.password, request.remember)
        .await?;

    establish_session(&session, &user).await?;
    Ok(Json(user))
}

/// POST /auth/biometric-login - sign in via the device biometric prompt.
pub async fn biometric_login(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CurrentUser>> {
    let user = state.accounts().biometric_sign_in().await?;

    establish_session(&session, &user).await?;
    Ok(Json(user))
}

/// POST /auth/logout - sign out.
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// POST /auth/forgot-password - send a password reset email.
///
/// Replies identically whether or not the address has an account.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<Value>> {
    state.accounts().forgot_password(&request.email).await?;
    Ok(Json(json!({
        "message": "If an account exists for this email, a reset link has been sent"
    })))
}

/// GET /auth/session - the signed-in user, if any.
pub async fn session(OptionalAuth(user): OptionalAuth) -> Json<SessionResponse> {
    Json(SessionResponse { user })
}
