//! Persisted secret record and its boundary validation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::params::{Algorithm, CipherParams, Encoding, OutputFormat};
use crate::errors::{Result, SealboxError};

/// What kind of secret a record holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretType {
    Password,
    Token,
    Key,
    Certificate,
    Other,
}

impl Default for SecretType {
    fn default() -> Self {
        SecretType::Other
    }
}

impl fmt::Display for SecretType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SecretType::Password => "password",
            SecretType::Token => "token",
            SecretType::Key => "key",
            SecretType::Certificate => "certificate",
            SecretType::Other => "other",
        };
        f.write_str(s)
    }
}

impl FromStr for SecretType {
    type Err = SealboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "password" => Ok(SecretType::Password),
            "token" => Ok(SecretType::Token),
            "key" => Ok(SecretType::Key),
            "certificate" => Ok(SecretType::Certificate),
            "other" => Ok(SecretType::Other),
            other => Err(SealboxError::Validation {
                field: "type",
                message: format!("unknown secret type '{other}'"),
            }),
        }
    }
}

/// A single persisted secret.
///
/// `value` is ciphertext in its final `format` representation and
/// `key` is the *resolved* key material the ciphertext was produced
/// under, so decrypt and rotate never re-resolve indirection
/// retroactively.  Records are immutable once created; update and
/// rotate replace the whole record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretRecord {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, rename = "type")]
    pub kind: SecretType,
    #[serde(flatten)]
    pub params: CipherParams,
    pub key: String,
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Request payload for `SecretStore::encrypt`.
///
/// Every optional field falls back to the documented default (or the
/// store-level settings for `key`).
#[derive(Debug, Clone, Default)]
pub struct EncryptRequest {
    pub name: String,
    pub value: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub kind: SecretType,
    pub key: Option<String>,
    pub params: CipherParams,
    pub expiration: Option<DateTime<Utc>>,
}

/// Filter for `list` / `list_values`.  `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct SecretFilter {
    pub kind: Option<SecretType>,
    pub algorithm: Option<Algorithm>,
    pub format: Option<OutputFormat>,
    pub encoding: Option<Encoding>,
}

impl SecretFilter {
    pub fn matches(&self, record: &SecretRecord) -> bool {
        self.kind.map_or(true, |k| record.kind == k)
            && self.algorithm.map_or(true, |a| record.params.algorithm == a)
            && self.format.map_or(true, |f| record.params.format == f)
            && self.encoding.map_or(true, |e| record.params.encoding == e)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate and normalize a secret name.
///
/// Names are case-insensitive: 3-64 chars of ASCII letters, digits,
/// hyphens, and underscores, stored lowercased.
pub fn normalize_name(name: &str) -> Result<String> {
    let name = name.trim().to_ascii_lowercase();
    if name.len() < 3 || name.len() > 64 {
        return Err(SealboxError::Validation {
            field: "name",
            message: "must be between 3 and 64 characters".into(),
        });
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
    {
        return Err(SealboxError::Validation {
            field: "name",
            message: format!(
                "'{name}' contains invalid characters; only letters, digits, hyphens, and underscores are allowed"
            ),
        });
    }
    Ok(name)
}

/// Validate a plaintext secret value at the API boundary.
pub fn validate_value(value: &str) -> Result<()> {
    if value.len() < 3 || value.len() > 1024 {
        return Err(SealboxError::Validation {
            field: "value",
            message: "must be between 3 and 1024 characters".into(),
        });
    }
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_lowercased_and_trimmed() {
        assert_eq!(normalize_name("  DB-Password_1 ").unwrap(), "db-password_1");
    }

    #[test]
    fn name_length_bounds() {
        assert!(normalize_name("ab").is_err());
        assert!(normalize_name(&"a".repeat(65)).is_err());
        assert!(normalize_name("abc").is_ok());
    }

    #[test]
    fn name_rejects_odd_characters() {
        assert!(normalize_name("has space").is_err());
        assert!(normalize_name("dot.ted").is_err());
    }

    #[test]
    fn value_length_bounds() {
        assert!(validate_value("ab").is_err());
        assert!(validate_value(&"v".repeat(1025)).is_err());
        assert!(validate_value("abc").is_ok());
    }

    #[test]
    fn record_serializes_with_flat_cipher_params() {
        let record = SecretRecord {
            name: "db-pass".into(),
            value: "636970686572".into(),
            description: None,
            tags: Vec::new(),
            kind: SecretType::Password,
            params: CipherParams::default(),
            key: "resolved-key".into(),
            expiration: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&record).unwrap();
        // Cipher params flatten into the record itself.
        assert_eq!(json["type"], "password");
        assert_eq!(json["algorithm"], "aes256");
        assert_eq!(json["encoding"], "hex");
        assert_eq!(json["format"], "raw");
        assert_eq!(json["iterations"], 10_000);
    }

    #[test]
    fn empty_filter_matches_everything() {
        let record = SecretRecord {
            name: "any".into(),
            value: "cipher".into(),
            description: None,
            tags: Vec::new(),
            kind: SecretType::Password,
            params: CipherParams::default(),
            key: "k".into(),
            expiration: None,
            created_at: Utc::now(),
        };
        assert!(SecretFilter::default().matches(&record));
        let filter = SecretFilter {
            kind: Some(SecretType::Key),
            ..SecretFilter::default()
        };
        assert!(!filter.matches(&record));
    }
}
