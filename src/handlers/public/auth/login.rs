// handlers/public/auth/login.rs - POST /login handler

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::utils::{require, trimmed};
use crate::error::{ApiError, ApiResult};
use crate::middleware::JsonBody;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(deserialize_with = "trimmed")]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// POST /login - Authenticate username and password, receive a JWT
///
/// Unknown username, account without a password and wrong password all
/// answer with the same 401 so callers cannot tell them apart.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    require("username", &payload.username)?;
    require("password", &payload.password)?;

    let user = state.users.find_by_username(&payload.username).await?;

    let authenticated = user
        .as_ref()
        .and_then(|user| user.password_hash.as_deref())
        .map(|digest| state.passwords.verify(digest, &payload.password))
        .unwrap_or(false);

    if !authenticated {
        tracing::info!(username = %payload.username, "Login failed");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = state.tokens.issue(&payload.username)?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
    }))
}
