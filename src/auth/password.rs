//! Password hashing via bcrypt.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt hash: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

/// One-way hashing of user passwords with a configurable bcrypt cost
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Salted bcrypt digest of `secret`
    pub fn hash(&self, secret: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::hash(secret, self.cost)?)
    }

    /// Check `secret` against a stored digest. A malformed digest is a mismatch.
    pub fn verify(&self, digest: &str, secret: &str) -> bool {
        match bcrypt::verify(secret, digest) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!("Stored password digest could not be verified: {}", e);
                false
            }
        }
    }
}
