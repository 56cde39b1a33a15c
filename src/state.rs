use std::sync::Arc;

use crate::auth::{JwtError, PasswordHasher, TokenIssuer};
use crate::config::{AppConfig, SmsProvider};
use crate::database::UserStore;
use crate::notify::{LogMailer, LogSmsSender, Mailer, SmsSender, TwilioSmsSender};
use crate::otp::OtpStore;

/// Everything a handler needs, built once at startup and shared by reference
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub otps: Arc<OtpStore>,
    pub tokens: TokenIssuer,
    pub passwords: PasswordHasher,
    pub sms: Arc<dyn SmsSender>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Wire collaborators from configuration around an already-connected store
    pub fn from_config(config: &AppConfig, users: Arc<dyn UserStore>) -> Result<Self, JwtError> {
        let tokens = TokenIssuer::new(
            &config.security.jwt_secret,
            config.security.jwt_expiry_hours,
            config.security.password_reset_expiry_minutes,
        )?;

        let sms: Arc<dyn SmsSender> = match &config.otp.sms {
            SmsProvider::Log => Arc::new(LogSmsSender),
            SmsProvider::Twilio { account_sid, auth_token, from } => Arc::new(TwilioSmsSender::new(
                account_sid.clone(),
                auth_token.clone(),
                from.clone(),
            )),
        };

        Ok(Self {
            users,
            otps: Arc::new(OtpStore::new(config.otp.ttl_secs, config.otp.max_attempts)),
            tokens,
            passwords: PasswordHasher::new(config.security.bcrypt_cost),
            sms,
            mailer: Arc::new(LogMailer),
        })
    }
}
