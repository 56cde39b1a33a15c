// handlers/public/auth/register.rs - POST /register (phone flow), POST /signup (password flow)

use axum::{extract::State, Json};
use serde::Deserialize;

use super::utils::{
    non_empty, registration_conflict, require, trimmed, validate_email_format, validate_phone_format,
};
use crate::database::{NewUser, StoreError};
use crate::error::{ApiError, ApiResult};
use crate::handlers::types::{AccessTokenResponse, MessageResponse};
use crate::middleware::JsonBody;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(deserialize_with = "trimmed")]
    pub username: String,
    #[serde(deserialize_with = "trimmed")]
    pub email: String,
    #[serde(deserialize_with = "trimmed")]
    pub phone_number: String,
    pub dob: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(deserialize_with = "trimmed")]
    pub username: String,
    pub password: String,
    #[serde(deserialize_with = "trimmed")]
    pub email: String,
    #[serde(deserialize_with = "trimmed")]
    pub phone_number: String,
}

/// POST /register - Create an account proven by phone OTP
///
/// Expected Input:
/// ```json
/// { "username": "al", "email": "a@x.com", "phone_number": "555", "dob": "1990-01-01", "location": "Oslo" }
/// ```
///
/// Conflicts name the field that collided.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<Json<AccessTokenResponse>> {
    require("username", &payload.username)?;
    require("email", &payload.email)?;
    require("phone_number", &payload.phone_number)?;
    validate_email_format(&payload.email)?;
    validate_phone_format(&payload.phone_number)?;

    let new_user = NewUser {
        username: payload.username,
        email: payload.email,
        phone_number: payload.phone_number,
        dob: non_empty(payload.dob),
        location: non_empty(payload.location),
        ..Default::default()
    };

    match state.users.insert(&new_user).await {
        Ok(()) => {}
        Err(StoreError::Conflict(field)) => {
            tracing::info!("Registration rejected, {:?} already exists", field);
            return Err(registration_conflict(field));
        }
        Err(StoreError::Database(e)) => {
            tracing::error!("Error inserting user into database: {}", e);
            return Err(ApiError::internal_server_error("Failed to register user."));
        }
    }

    let access_token = state.tokens.issue(&new_user.username).map_err(|e| {
        tracing::error!("Failed to sign token for new user: {}", e);
        ApiError::internal_server_error("Failed to generate access token.")
    })?;

    tracing::info!(username = %new_user.username, "User registered");
    Ok(Json(AccessTokenResponse {
        message: "User registered successfully".to_string(),
        access_token,
    }))
}

/// POST /signup - Create a password account
///
/// Any uniqueness conflict gets the same generic message; the field is only logged.
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SignupRequest>,
) -> ApiResult<Json<MessageResponse>> {
    require("username", &payload.username)?;
    require("password", &payload.password)?;
    require("email", &payload.email)?;
    require("phone_number", &payload.phone_number)?;
    validate_email_format(&payload.email)?;
    validate_phone_format(&payload.phone_number)?;

    let password_hash = state.passwords.hash(&payload.password)?;

    let new_user = NewUser {
        username: payload.username,
        email: payload.email,
        phone_number: payload.phone_number,
        password_hash: Some(password_hash),
        ..Default::default()
    };

    // StoreError -> ApiError renders conflicts generically
    state.users.insert(&new_user).await?;

    tracing::info!(username = %new_user.username, "User signed up");
    Ok(Json(MessageResponse::new("Signup successful")))
}
