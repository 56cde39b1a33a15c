use async_trait::async_trait;

use super::DeliveryError;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError>;
}

/// Writes outgoing mail to the log. No SMTP relay is configured for this service.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        tracing::info!(to = %to, subject = %subject, "[dev] email skipped: {}", body);
        Ok(())
    }
}

pub fn password_reset_message(token: &str) -> (String, String) {
    (
        "Password reset".to_string(),
        format!("Use this token to reset your password: {}", token),
    )
}
