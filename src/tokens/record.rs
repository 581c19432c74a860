//! Persisted token record.
//!
//! The `token` field holds the HMAC fingerprint of the plaintext, never
//! the plaintext itself.  Only the caller who received the plaintext at
//! generation time can present it again.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SealboxError};

/// Purpose of an issued token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenType {
    Verification,
    Passwordless,
    PasswordReset,
    ApiKey,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenType::Verification => "verification",
            TokenType::Passwordless => "passwordless",
            TokenType::PasswordReset => "password-reset",
            TokenType::ApiKey => "api-key",
        };
        f.write_str(s)
    }
}

impl FromStr for TokenType {
    type Err = SealboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "verification" => Ok(TokenType::Verification),
            "passwordless" => Ok(TokenType::Passwordless),
            "password-reset" => Ok(TokenType::PasswordReset),
            "api-key" => Ok(TokenType::ApiKey),
            other => Err(SealboxError::Validation {
                field: "type",
                message: format!("unknown token type '{other}'"),
            }),
        }
    }
}

/// A single persisted token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    #[serde(rename = "type")]
    pub kind: TokenType,

    /// HMAC-SHA256 fingerprint of the plaintext token, hex-encoded.
    pub token: String,

    /// Display name, used for user API keys.
    #[serde(default)]
    pub name: Option<String>,

    /// Opaque owner identifier.
    pub owner: String,

    /// Expiry deadline in epoch milliseconds; `None` never expires.
    #[serde(default)]
    pub expiry: Option<i64>,

    /// Updated on successful `check(mark_used = true)` only.
    #[serde(default)]
    pub last_used_at: Option<i64>,
}

impl TokenRecord {
    /// Whether the expiry deadline has passed as of `now` (epoch ms).
    pub fn expired_at(&self, now: i64) -> bool {
        matches!(self.expiry, Some(deadline) if deadline < now)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
