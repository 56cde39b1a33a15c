// notify/mod.rs - Outbound delivery of codes and links
//
// Handlers only see the traits; main picks the implementation from config.

pub mod mail;
pub mod sms;

use thiserror::Error;

pub use mail::{LogMailer, Mailer};
pub use sms::{LogSmsSender, SmsSender, TwilioSmsSender};

/// A message could not be handed to its channel. Never invalidates stored state.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Request to provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Provider returned {status}: {body}")]
    Rejected { status: u16, body: String },
}
