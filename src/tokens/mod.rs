//! Opaque token issuance and validation.
//!
//! This module provides:
//! - `TokenRecord` and `TokenType` (`record`)
//! - The `TokenBackend` storage seam and an in-memory implementation
//!   (`backend`)
//! - `TokenService`: generate / check / remove / clear_expired
//!
//! A generated token is 25 cryptographically random bytes, hex-encoded
//! to 50 characters and returned to the caller exactly once.  Only the
//! HMAC-SHA256 fingerprint of it is ever persisted, keyed by a
//! process-wide salt that must be configured before the service can be
//! built.

pub mod backend;
pub mod record;

use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::errors::{Result, SealboxError};

pub use backend::{MemoryTokenBackend, TokenBackend};
pub use record::{TokenRecord, TokenType};

type HmacSha256 = Hmac<Sha256>;

/// Plaintext token length in hex characters.
pub const TOKEN_LENGTH: usize = 50;

/// A freshly generated token: the plaintext (one-time, never stored)
/// and the persisted record carrying only the fingerprint.
#[derive(Debug)]
pub struct IssuedToken {
    pub token: String,
    pub record: TokenRecord,
}

/// Outcome of a token check.  Owner mismatch is reported as `NotFound`
/// so existence never leaks across owners; an expired token is a
/// distinct outcome from an unknown one.
#[derive(Debug)]
pub enum CheckOutcome {
    Valid(TokenRecord),
    Expired,
    NotFound,
}

impl CheckOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, CheckOutcome::Valid(_))
    }
}

/// Token issuance and validation over an external `TokenBackend`.
pub struct TokenService<B: TokenBackend> {
    backend: B,
    salt: Zeroizing<Vec<u8>>,
}

impl<B: TokenBackend> TokenService<B> {
    /// Build the service.  The fingerprint salt is a hard startup
    /// dependency: an empty salt is a construction-time `Config` error,
    /// never a per-request one.
    pub fn new(backend: B, salt: &str) -> Result<Self> {
        if salt.is_empty() {
            return Err(SealboxError::Config(
                "token fingerprint salt must be configured".into(),
            ));
        }
        Ok(Self {
            backend,
            salt: Zeroizing::new(salt.as_bytes().to_vec()),
        })
    }

    // ------------------------------------------------------------------
    // Issuance
    // ------------------------------------------------------------------

    /// Generate a new token for `owner`.
    ///
    /// `expiry` is an absolute deadline in epoch milliseconds.  The
    /// returned plaintext is the only copy that will ever exist.
    pub fn generate(
        &self,
        kind: TokenType,
        owner: &str,
        name: Option<&str>,
        expiry: Option<i64>,
    ) -> Result<IssuedToken> {
        if owner.is_empty() {
            return Err(SealboxError::Validation {
                field: "owner",
                message: "must not be empty".into(),
            });
        }

        let token = random_token();
        let fingerprint = self.fingerprint(&token)?;

        let record = self.backend.insert(TokenRecord {
            kind,
            token: fingerprint,
            name: name.map(str::to_string),
            owner: owner.to_string(),
            expiry,
            last_used_at: None,
        })?;

        Ok(IssuedToken { token, record })
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Check a plaintext token.
    ///
    /// Re-derives the fingerprint and looks up `(type, fingerprint)`.
    /// When `owner` is supplied it must match the stored owner.  With
    /// `mark_used`, `last_used_at` is touched on the valid path before
    /// the record is returned.
    pub fn check(
        &self,
        kind: TokenType,
        token: &str,
        owner: Option<&str>,
        mark_used: bool,
    ) -> Result<CheckOutcome> {
        let fingerprint = self.fingerprint(token)?;

        let Some(record) = self.backend.find(kind, &fingerprint)? else {
            return Ok(CheckOutcome::NotFound);
        };

        if let Some(owner) = owner {
            if record.owner != owner {
                return Ok(CheckOutcome::NotFound);
            }
        }

        if record.expired_at(now_ms()) {
            return Ok(CheckOutcome::Expired);
        }

        let record = if mark_used {
            self.backend
                .touch(kind, &fingerprint, now_ms())?
                .unwrap_or(record)
        } else {
            record
        };

        Ok(CheckOutcome::Valid(record))
    }

    /// Remove an invalidated token.  No-op when absent.
    pub fn remove(&self, kind: TokenType, token: &str) -> Result<Option<TokenRecord>> {
        let fingerprint = self.fingerprint(token)?;
        self.backend.remove(kind, &fingerprint)
    }

    /// Delete every token whose expiry has passed.  Returns the count
    /// removed.  The schedule that triggers this sweep is external.
    pub fn clear_expired(&self) -> Result<usize> {
        let count = self.backend.remove_expired(now_ms())?;
        if count > 0 {
            log::info!("removed {count} expired token(s)");
        }
        Ok(count)
    }

    // ------------------------------------------------------------------
    // Internal
    // ------------------------------------------------------------------

    /// Deterministic salted fingerprint of a plaintext token.
    fn fingerprint(&self, token: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(&self.salt)
            .map_err(|e| SealboxError::Config(format!("invalid fingerprint salt: {e}")))?;
        mac.update(token.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

/// 25 random bytes, hex-encoded to a 50-character plaintext token.
fn random_token() -> String {
    let mut bytes = [0u8; TOKEN_LENGTH / 2];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_tokens_have_fixed_length_and_differ() {
        let a = random_token();
        let b = random_token();
        assert_eq!(a.len(), TOKEN_LENGTH);
        assert_eq!(b.len(), TOKEN_LENGTH);
        assert_ne!(a, b);
    }

    #[test]
    fn fingerprint_is_deterministic_and_salted() {
        let svc_a = TokenService::new(MemoryTokenBackend::new(), "salt-a").unwrap();
        let svc_b = TokenService::new(MemoryTokenBackend::new(), "salt-b").unwrap();

        let fp1 = svc_a.fingerprint("my-token").unwrap();
        let fp2 = svc_a.fingerprint("my-token").unwrap();
        let fp3 = svc_b.fingerprint("my-token").unwrap();

        assert_eq!(fp1, fp2);
        assert_ne!(fp1, fp3);
        assert_eq!(fp1.len(), 64); // hex of SHA-256
    }

    #[test]
    fn empty_salt_is_a_construction_error() {
        assert!(matches!(
            TokenService::new(MemoryTokenBackend::new(), ""),
            Err(SealboxError::Config(_))
        ));
    }
}
