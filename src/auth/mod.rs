pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

pub use password::PasswordHasher;

/// What a token may be used for. A reset token never opens a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Session,
    PasswordReset,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued to
    pub sub: String,
    pub kind: TokenKind,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
    /// Fingerprint of the password hash a reset token was issued against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pwd: Option<String>,
}

impl Claims {
    fn new(username: &str, kind: TokenKind, lifetime: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: username.to_string(),
            kind,
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            pwd: None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Token lifetime out of range")]
    InvalidLifetime,

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("Authorization header must use Bearer token format")]
    MissingBearer,
}

/// Signs and verifies HS256 tokens with a symmetric secret from configuration
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_lifetime: Duration,
    reset_lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, session_hours: u64, reset_minutes: u64) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            session_lifetime: lifetime(session_hours, Duration::try_hours)?,
            reset_lifetime: lifetime(reset_minutes, Duration::try_minutes)?,
        })
    }

    /// Mint a session token for `username`
    pub fn issue(&self, username: &str) -> Result<String, JwtError> {
        self.sign(&Claims::new(username, TokenKind::Session, self.session_lifetime))
    }

    /// Verify a session token and return its subject
    pub fn verify(&self, token: &str) -> Result<String, JwtError> {
        self.verify_kind(token, TokenKind::Session)
    }

    /// Verify the raw value of an `Authorization` header
    pub fn verify_bearer(&self, header_value: &str) -> Result<String, JwtError> {
        let token = header_value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(JwtError::MissingBearer)?;

        self.verify(token)
    }

    /// Mint a reset token bound to the account's current password hash.
    /// Once the password changes the token no longer matches.
    pub fn issue_password_reset(
        &self,
        username: &str,
        password_hash: Option<&str>,
    ) -> Result<String, JwtError> {
        let mut claims = Claims::new(username, TokenKind::PasswordReset, self.reset_lifetime);
        claims.pwd = Some(password_fingerprint(password_hash));
        self.sign(&claims)
    }

    pub fn verify_password_reset(&self, token: &str) -> Result<ResetGrant, JwtError> {
        let claims = self.decode_kind(token, TokenKind::PasswordReset)?;
        let fingerprint = claims
            .pwd
            .ok_or_else(|| JwtError::InvalidToken("reset token without fingerprint".to_string()))?;

        Ok(ResetGrant { username: claims.sub, fingerprint })
    }

    fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    fn verify_kind(&self, token: &str, expected: TokenKind) -> Result<String, JwtError> {
        self.decode_kind(token, expected).map(|claims| claims.sub)
    }

    fn decode_kind(&self, token: &str, expected: TokenKind) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))?
            .claims;

        if claims.kind != expected {
            return Err(JwtError::InvalidToken(format!("unexpected token kind {:?}", claims.kind)));
        }

        Ok(claims)
    }
}

/// A verified reset token: who it was for and which password it may replace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetGrant {
    pub username: String,
    pub fingerprint: String,
}

/// Short SHA-256 prefix of a stored password hash. Accounts without a
/// password fingerprint the empty string.
pub fn password_fingerprint(password_hash: Option<&str>) -> String {
    let digest = Sha256::digest(password_hash.unwrap_or_default().as_bytes());
    digest.iter().take(8).map(|b| format!("{:02x}", b)).collect()
}

fn lifetime(amount: u64, to_delta: fn(i64) -> Option<Duration>) -> Result<Duration, JwtError> {
    i64::try_from(amount)
        .ok()
        .filter(|amount| *amount > 0)
        .and_then(to_delta)
        .ok_or(JwtError::InvalidLifetime)
}
