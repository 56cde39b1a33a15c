// handlers/public/auth/password.rs - POST /forgot-password, POST /reset-password

use axum::{extract::State, Json};
use serde::Deserialize;

use super::utils::{require, trimmed, validate_email_format};
use crate::auth::{password_fingerprint, JwtError};
use crate::error::{ApiError, ApiResult};
use crate::handlers::types::MessageResponse;
use crate::middleware::JsonBody;
use crate::notify::mail::password_reset_message;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(deserialize_with = "trimmed")]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(deserialize_with = "trimmed")]
    pub token: String,
    pub new_password: String,
}

/// POST /forgot-password - Mail a short-lived reset token to the account's email
pub async fn forgot_password(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    require("email", &payload.email)?;
    validate_email_format(&payload.email)?;

    let user = state
        .users
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::not_found("Email not found"))?;

    let token = state
        .tokens
        .issue_password_reset(&user.username, user.password_hash.as_deref())?;
    let (subject, body) = password_reset_message(&token);

    if let Err(e) = state.mailer.send(&user.email, &subject, &body).await {
        tracing::error!("Failed to send password reset email: {}", e);
        return Err(ApiError::internal_server_error("Failed to send password reset email"));
    }

    Ok(Json(MessageResponse::new("Password reset instructions sent")))
}

/// POST /reset-password - Exchange a reset token for a new password
///
/// A token only replaces the password it was issued against, so it stops
/// working after the first successful reset.
pub async fn reset_password(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    require("token", &payload.token)?;
    require("new_password", &payload.new_password)?;

    let grant = state.tokens.verify_password_reset(&payload.token).map_err(|e| match e {
        JwtError::InvalidToken(reason) => {
            tracing::debug!("Reset token rejected: {}", reason);
            invalid_reset_token()
        }
        other => ApiError::from(other),
    })?;

    let user = state
        .users
        .find_by_username(&grant.username)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let current_hash = user.password_hash.as_deref();
    if password_fingerprint(current_hash) != grant.fingerprint {
        tracing::info!(username = %user.username, "Reset token already used or superseded");
        return Err(invalid_reset_token());
    }

    let password_hash = state.passwords.hash(&payload.new_password)?;

    // A concurrent reset with the same token loses here
    if !state.users.update_password(&user.username, current_hash, &password_hash).await? {
        return Err(invalid_reset_token());
    }

    tracing::info!(username = %user.username, "Password reset");
    Ok(Json(MessageResponse::new("Password reset successful")))
}

fn invalid_reset_token() -> ApiError {
    ApiError::unauthorized("Invalid or expired reset token")
}
