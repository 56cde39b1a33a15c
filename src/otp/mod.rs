//! One-time codes proving possession of a phone number.
//!
//! Challenges are kept in memory, one per phone number. Issuing a new code
//! replaces the previous one and resets its failure count. Entries expire after
//! the configured TTL and lock after `max_attempts` wrong guesses.
//!
//! Operations on different phone numbers never contend. For the same number the
//! last issue wins, and a validation racing a re-issue may observe either code.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::{rngs::OsRng, Rng};

#[derive(Debug, Clone)]
struct Challenge {
    code: String,
    issued_at: DateTime<Utc>,
    failed_attempts: u32,
}

/// Result of checking a submitted code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpCheck {
    Valid,
    /// No challenge was issued for this number (or it was evicted)
    Missing,
    Mismatch,
    Expired,
    /// Too many wrong guesses; a new code must be issued
    Locked,
}

pub struct OtpStore {
    challenges: DashMap<String, Challenge>,
    ttl: Duration,
    max_attempts: u32,
}

impl OtpStore {
    pub fn new(ttl_secs: u64, max_attempts: u32) -> Self {
        Self {
            challenges: DashMap::new(),
            // Saturates rather than overflowing
            ttl: i64::try_from(ttl_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or_else(Duration::max_value),
            max_attempts,
        }
    }

    /// Generate and store a fresh code for `phone_number`
    pub fn issue(&self, phone_number: &str) -> String {
        self.issue_at(phone_number, Utc::now())
    }

    pub(crate) fn issue_at(&self, phone_number: &str, now: DateTime<Utc>) -> String {
        self.purge_expired_at(now);

        let code = generate_code();
        self.challenges.insert(
            phone_number.to_string(),
            Challenge { code: code.clone(), issued_at: now, failed_attempts: 0 },
        );
        code
    }

    pub fn check(&self, phone_number: &str, code: &str) -> OtpCheck {
        self.check_at(phone_number, code, Utc::now())
    }

    /// True iff `code` is the live code for `phone_number`
    pub fn validate(&self, phone_number: &str, code: &str) -> bool {
        self.check(phone_number, code) == OtpCheck::Valid
    }

    pub(crate) fn check_at(&self, phone_number: &str, code: &str, now: DateTime<Utc>) -> OtpCheck {
        let outcome = {
            let Some(mut entry) = self.challenges.get_mut(phone_number) else {
                return OtpCheck::Missing;
            };

            if now - entry.issued_at >= self.ttl {
                OtpCheck::Expired
            } else if entry.failed_attempts >= self.max_attempts {
                OtpCheck::Locked
            } else if entry.code == code {
                OtpCheck::Valid
            } else {
                entry.failed_attempts += 1;
                OtpCheck::Mismatch
            }
        };

        if outcome == OtpCheck::Expired {
            // Only drop the entry if nobody re-issued in between
            self.challenges
                .remove_if(phone_number, |_, challenge| now - challenge.issued_at >= self.ttl);
        }

        outcome
    }

    /// Drop every challenge older than the TTL
    pub fn purge_expired(&self) {
        self.purge_expired_at(Utc::now());
    }

    fn purge_expired_at(&self, now: DateTime<Utc>) {
        self.challenges.retain(|_, challenge| now - challenge.issued_at < self.ttl);
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }
}

/// Uniform 6-digit code from the OS CSPRNG, zero-padded
fn generate_code() -> String {
    format!("{:06}", OsRng.gen_range(0..1_000_000u32))
}
