// handlers/public/auth/sso.rs - POST /login-with-sso, POST /register-with-sso

use axum::{extract::State, Json};
use serde::Deserialize;

use super::utils::{
    non_empty, registration_conflict, require, trimmed, validate_email_format, validate_phone_format,
};
use crate::database::{NewUser, StoreError, UserProfile};
use crate::error::{ApiError, ApiResult};
use crate::handlers::types::{MessageResponse, SessionResponse};
use crate::middleware::JsonBody;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SsoLoginRequest {
    #[serde(deserialize_with = "trimmed")]
    pub email: String,
    #[serde(deserialize_with = "trimmed")]
    pub sso_provider: String,
    #[serde(deserialize_with = "trimmed")]
    pub sso_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SsoRegisterRequest {
    #[serde(deserialize_with = "trimmed")]
    pub username: String,
    #[serde(deserialize_with = "trimmed")]
    pub email: String,
    #[serde(deserialize_with = "trimmed")]
    pub phone_number: String,
    pub dob: Option<String>,
    pub location: Option<String>,
    #[serde(deserialize_with = "trimmed")]
    pub sso_provider: String,
    #[serde(deserialize_with = "trimmed")]
    pub sso_id: String,
}

/// POST /login-with-sso - Log in an account linked to an identity provider
pub async fn login_with_sso(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SsoLoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    require("email", &payload.email)?;
    require("sso_provider", &payload.sso_provider)?;
    require("sso_id", &payload.sso_id)?;

    let user = state
        .users
        .find_by_sso(&payload.email, &payload.sso_provider, &payload.sso_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("SSO login failed, user not found"))?;

    let access_token = state.tokens.issue(&user.username)?;

    Ok(Json(SessionResponse {
        message: "SSO login successful".to_string(),
        access_token,
        is_registered: None,
        user: Some(UserProfile::from(&user)),
    }))
}

/// POST /register-with-sso - Create an account linked to an identity provider
///
/// Same conflict handling as phone registration, plus the provider identity.
pub async fn register_with_sso(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SsoRegisterRequest>,
) -> ApiResult<Json<MessageResponse>> {
    require("username", &payload.username)?;
    require("email", &payload.email)?;
    require("phone_number", &payload.phone_number)?;
    require("sso_provider", &payload.sso_provider)?;
    require("sso_id", &payload.sso_id)?;
    validate_email_format(&payload.email)?;
    validate_phone_format(&payload.phone_number)?;

    let new_user = NewUser {
        username: payload.username,
        email: payload.email,
        phone_number: payload.phone_number,
        password_hash: None,
        dob: non_empty(payload.dob),
        location: non_empty(payload.location),
        sso_provider: Some(payload.sso_provider),
        sso_id: Some(payload.sso_id),
    };

    match state.users.insert(&new_user).await {
        Ok(()) => {}
        Err(StoreError::Conflict(field)) => {
            tracing::info!("SSO registration rejected, {:?} already exists", field);
            return Err(registration_conflict(field));
        }
        Err(StoreError::Database(e)) => {
            tracing::error!("Error inserting SSO user into database: {}", e);
            return Err(ApiError::internal_server_error("Failed to register SSO user"));
        }
    }

    tracing::info!(username = %new_user.username, "SSO user registered");
    Ok(Json(MessageResponse::new("SSO user registered successfully")))
}
