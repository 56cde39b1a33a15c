// Response bodies shared across handlers. Every body carries `message`.

use serde::Serialize;

use crate::database::UserProfile;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Message plus a session token under `access_token`
#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub message: String,
    pub access_token: String,
}

/// Message plus the caller's profile
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: String,
    pub user: UserProfile,
}

/// Session established through OTP or SSO
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub message: String,
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_registered: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}
