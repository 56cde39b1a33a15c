// handlers/protected/auth/update.rs - PUT /update-username, /update-email, /update-phone
//
// Each update names the old value explicitly; only the caller's own row is
// touched, and only while it still holds that old value.

use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use crate::database::{StoreError, UpdatableField};
use crate::error::{ApiError, ApiResult};
use crate::handlers::public::auth::utils::{require, trimmed, validate_email_format, validate_phone_format};
use crate::handlers::types::{AccessTokenResponse, MessageResponse};
use crate::middleware::{AuthUser, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateUsernameRequest {
    #[serde(deserialize_with = "trimmed")]
    pub old_username: String,
    #[serde(deserialize_with = "trimmed")]
    pub new_username: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmailRequest {
    #[serde(deserialize_with = "trimmed")]
    pub old_email: String,
    #[serde(deserialize_with = "trimmed")]
    pub new_email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePhoneRequest {
    #[serde(deserialize_with = "trimmed")]
    pub old_phone_number: String,
    #[serde(deserialize_with = "trimmed")]
    pub new_phone_number: String,
}

/// PUT /update-username - Rename the caller's account
///
/// The old token names the old username, so a fresh one is returned.
pub async fn update_username(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(payload): JsonBody<UpdateUsernameRequest>,
) -> ApiResult<Json<AccessTokenResponse>> {
    require("old_username", &payload.old_username)?;
    require("new_username", &payload.new_username)?;

    apply_update(
        &state,
        &auth,
        UpdatableField::Username,
        &payload.old_username,
        &payload.new_username,
    )
    .await?;

    let access_token = state.tokens.issue(&payload.new_username)?;

    Ok(Json(AccessTokenResponse {
        message: "Username updated successfully".to_string(),
        access_token,
    }))
}

/// PUT /update-email
pub async fn update_email(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(payload): JsonBody<UpdateEmailRequest>,
) -> ApiResult<Json<MessageResponse>> {
    require("old_email", &payload.old_email)?;
    require("new_email", &payload.new_email)?;
    validate_email_format(&payload.new_email)?;

    apply_update(&state, &auth, UpdatableField::Email, &payload.old_email, &payload.new_email).await?;

    Ok(Json(MessageResponse::new("Email updated successfully")))
}

/// PUT /update-phone
pub async fn update_phone(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(payload): JsonBody<UpdatePhoneRequest>,
) -> ApiResult<Json<MessageResponse>> {
    require("old_phone_number", &payload.old_phone_number)?;
    require("new_phone_number", &payload.new_phone_number)?;
    validate_phone_format(&payload.new_phone_number)?;

    apply_update(
        &state,
        &auth,
        UpdatableField::PhoneNumber,
        &payload.old_phone_number,
        &payload.new_phone_number,
    )
    .await?;

    Ok(Json(MessageResponse::new("Phone number updated successfully")))
}

async fn apply_update(
    state: &AppState,
    auth: &AuthUser,
    field: UpdatableField,
    old: &str,
    new: &str,
) -> Result<(), ApiError> {
    match state.users.update_field(field, &auth.username, old, new).await {
        Ok(true) => {
            tracing::info!(username = %auth.username, "Updated {}", field.column());
            Ok(())
        }
        Ok(false) => Err(ApiError::not_found("User not found")),
        Err(StoreError::Conflict(_)) => Err(ApiError::conflict(update_conflict_message(field))),
        Err(StoreError::Database(e)) => Err(ApiError::database(e)),
    }
}

fn update_conflict_message(field: UpdatableField) -> &'static str {
    match field {
        UpdatableField::Username => "Username already exists",
        UpdatableField::Email => "Email already exists",
        UpdatableField::PhoneNumber => "Phone number already exists",
    }
}
