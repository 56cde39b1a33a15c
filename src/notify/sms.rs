use async_trait::async_trait;
use reqwest::Client;

use super::DeliveryError;

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, phone_number: &str, body: &str) -> Result<(), DeliveryError>;
}

/// Development sender: writes the message to the log instead of sending it
#[derive(Debug, Default, Clone)]
pub struct LogSmsSender;

#[async_trait]
impl SmsSender for LogSmsSender {
    async fn send(&self, phone_number: &str, body: &str) -> Result<(), DeliveryError> {
        tracing::info!(to = %phone_number, "[dev] SMS skipped: {}", body);
        Ok(())
    }
}

/// Sends through the Twilio Messages API
#[derive(Debug, Clone)]
pub struct TwilioSmsSender {
    client: Client,
    account_sid: String,
    auth_token: String,
    from: String,
    base_url: String,
}

impl TwilioSmsSender {
    pub fn new(account_sid: String, auth_token: String, from: String) -> Self {
        Self {
            client: Client::new(),
            account_sid,
            auth_token,
            from,
            base_url: "https://api.twilio.com".to_string(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/2010-04-01/Accounts/{}/Messages.json", self.base_url, self.account_sid)
    }
}

#[async_trait]
impl SmsSender for TwilioSmsSender {
    async fn send(&self, phone_number: &str, body: &str) -> Result<(), DeliveryError> {
        let form = [("To", phone_number), ("From", self.from.as_str()), ("Body", body)];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Twilio error ({}): {}", status, body);
            return Err(DeliveryError::Rejected { status: status.as_u16(), body });
        }

        tracing::info!(to = %phone_number, "SMS sent");
        Ok(())
    }
}

/// Text of the OTP message
pub fn otp_message(code: &str) -> String {
    format!("Your verification code is {}", code)
}
