// handlers/public/auth/otp.rs - POST /send-otp, POST /validate-otp

use axum::{extract::State, Json};
use serde::Deserialize;

use super::utils::{require, trimmed, validate_phone_format};
use crate::database::UserProfile;
use crate::error::{ApiError, ApiResult};
use crate::handlers::types::{MessageResponse, SessionResponse};
use crate::middleware::JsonBody;
use crate::notify::sms::otp_message;
use crate::otp::OtpCheck;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    #[serde(deserialize_with = "trimmed")]
    pub phone_number: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateOtpRequest {
    #[serde(deserialize_with = "trimmed")]
    pub phone_number: String,
    #[serde(deserialize_with = "trimmed")]
    pub otp: String,
}

/// POST /send-otp - Issue a code for a phone number and text it
///
/// The code is stored before delivery; a failed send still leaves it valid.
pub async fn send_otp(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SendOtpRequest>,
) -> ApiResult<Json<MessageResponse>> {
    require("phone_number", &payload.phone_number)?;
    validate_phone_format(&payload.phone_number)?;

    let code = state.otps.issue(&payload.phone_number);
    tracing::info!(phone = %payload.phone_number, "OTP issued");

    if let Err(e) = state.sms.send(&payload.phone_number, &otp_message(&code)).await {
        tracing::error!("Failed to send OTP via SMS: {}", e);
        return Err(ApiError::internal_server_error("Failed to send OTP"));
    }

    Ok(Json(MessageResponse::new("OTP sent successfully")))
}

/// POST /validate-otp - Check a code and log the phone's account in
///
/// An unknown phone number is a soft failure (200, `is_registered: false`)
/// so the client can continue into registration.
pub async fn validate_otp(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ValidateOtpRequest>,
) -> ApiResult<Json<SessionResponse>> {
    require("phone_number", &payload.phone_number)?;
    require("otp", &payload.otp)?;

    match state.otps.check(&payload.phone_number, &payload.otp) {
        OtpCheck::Valid => {}
        OtpCheck::Expired => return Err(ApiError::unauthorized("OTP expired")),
        OtpCheck::Locked => return Err(ApiError::unauthorized("Too many failed attempts")),
        OtpCheck::Missing | OtpCheck::Mismatch => return Err(ApiError::unauthorized("Invalid OTP")),
    }

    let Some(user) = state.users.find_by_phone(&payload.phone_number).await? else {
        return Ok(Json(SessionResponse {
            message: "User not registered".to_string(),
            access_token: String::new(),
            is_registered: Some(false),
            user: None,
        }));
    };

    let access_token = state.tokens.issue(&user.username)?;

    Ok(Json(SessionResponse {
        message: "OTP validated successfully".to_string(),
        access_token,
        is_registered: Some(true),
        user: Some(UserProfile::from(&user)),
    }))
}
