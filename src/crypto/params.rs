//! Cipher parameter set and its enums.
//!
//! Every tuning knob the cipher engine accepts lives here as a real
//! enum or field with the documented default, so a parameter bag is
//! validated once at the API boundary instead of being passed around
//! as loose strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SealboxError};

/// Symmetric cipher selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Aes256,
    Aes192,
    Aes128,
    Des3,
    Rc4,
}

impl Algorithm {
    /// Required key size in bytes for block ciphers.
    ///
    /// RC4 accepts 16, 24, or 32-byte keys; this returns its preferred
    /// size (used as the KDF output length when `length` is unset).
    pub fn key_len(self) -> usize {
        match self {
            Algorithm::Aes256 => 32,
            Algorithm::Aes192 | Algorithm::Des3 => 24,
            Algorithm::Aes128 => 16,
            Algorithm::Rc4 => 16,
        }
    }

    /// Required IV size in bytes, or `None` for stream ciphers.
    pub fn iv_len(self) -> Option<usize> {
        match self {
            Algorithm::Aes256 | Algorithm::Aes192 | Algorithm::Aes128 => Some(16),
            Algorithm::Des3 => Some(8),
            Algorithm::Rc4 => None,
        }
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::Aes256
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Algorithm::Aes256 => "aes256",
            Algorithm::Aes192 => "aes192",
            Algorithm::Aes128 => "aes128",
            Algorithm::Des3 => "des3",
            Algorithm::Rc4 => "rc4",
        };
        f.write_str(s)
    }
}

impl FromStr for Algorithm {
    type Err = SealboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "aes256" => Ok(Algorithm::Aes256),
            "aes192" => Ok(Algorithm::Aes192),
            "aes128" => Ok(Algorithm::Aes128),
            "des3" => Ok(Algorithm::Des3),
            "rc4" => Ok(Algorithm::Rc4),
            other => Err(SealboxError::Validation {
                field: "algorithm",
                message: format!("unknown algorithm '{other}'"),
            }),
        }
    }
}

/// Hash primitive used by the PBKDF2 key-derivation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Digest {
    Sha256,
    Sha512,
    Sha1,
    Md5,
}

impl Default for Digest {
    fn default() -> Self {
        Digest::Sha256
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Digest::Sha256 => "sha256",
            Digest::Sha512 => "sha512",
            Digest::Sha1 => "sha1",
            Digest::Md5 => "md5",
        };
        f.write_str(s)
    }
}

impl FromStr for Digest {
    type Err = SealboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sha256" => Ok(Digest::Sha256),
            "sha512" => Ok(Digest::Sha512),
            "sha1" => Ok(Digest::Sha1),
            "md5" => Ok(Digest::Md5),
            other => Err(SealboxError::Validation {
                field: "digest",
                message: format!("unknown digest '{other}'"),
            }),
        }
    }
}

/// Intermediate byte-to-text transform applied right after the raw
/// cipher operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Hex,
    Base64,
    Utf8,
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::Hex
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Encoding::Hex => "hex",
            Encoding::Base64 => "base64",
            Encoding::Utf8 => "utf8",
        };
        f.write_str(s)
    }
}

impl FromStr for Encoding {
    type Err = SealboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hex" => Ok(Encoding::Hex),
            "base64" => Ok(Encoding::Base64),
            "utf8" => Ok(Encoding::Utf8),
            other => Err(SealboxError::Validation {
                field: "encoding",
                message: format!("unknown encoding '{other}'"),
            }),
        }
    }
}

/// Final outer representation of the ciphertext.
///
/// `Raw` and `Utf8` pass the encoded text through unchanged; `Hex` and
/// `Base64` wrap the encoded text in one more transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Raw,
    Hex,
    Base64,
    Utf8,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Raw
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputFormat::Raw => "raw",
            OutputFormat::Hex => "hex",
            OutputFormat::Base64 => "base64",
            OutputFormat::Utf8 => "utf8",
        };
        f.write_str(s)
    }
}

impl FromStr for OutputFormat {
    type Err = SealboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "raw" => Ok(OutputFormat::Raw),
            "hex" => Ok(OutputFormat::Hex),
            "base64" => Ok(OutputFormat::Base64),
            "utf8" => Ok(OutputFormat::Utf8),
            other => Err(SealboxError::InvalidFormat(other.to_string())),
        }
    }
}

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 10_000;

/// Default derived key length in bytes (matches aes256).
pub const DEFAULT_KEY_LENGTH: usize = 32;

/// Complete parameter set for one cipher operation.
///
/// An empty `iv` means "no IV": valid for RC4, an error for the block
/// ciphers, which never get a silently defaulted IV. An empty `salt`
/// (or zero `iterations`) disables the PBKDF2 step, in which case the
/// key string's bytes are used directly and must already be the exact
/// key size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CipherParams {
    #[serde(default)]
    pub algorithm: Algorithm,

    #[serde(default)]
    pub iv: String,

    #[serde(default)]
    pub salt: String,

    #[serde(default = "default_iterations")]
    pub iterations: u32,

    #[serde(default = "default_key_length")]
    pub length: usize,

    #[serde(default)]
    pub digest: Digest,

    #[serde(default)]
    pub encoding: Encoding,

    #[serde(default)]
    pub format: OutputFormat,
}

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_key_length() -> usize {
    DEFAULT_KEY_LENGTH
}

impl Default for CipherParams {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            iv: String::new(),
            salt: String::new(),
            iterations: DEFAULT_ITERATIONS,
            length: DEFAULT_KEY_LENGTH,
            digest: Digest::default(),
            encoding: Encoding::default(),
            format: OutputFormat::default(),
        }
    }
}

impl CipherParams {
    /// Returns `true` when the salt/iterations pair enables PBKDF2.
    pub fn uses_kdf(&self) -> bool {
        !self.salt.is_empty() && self.iterations > 0
    }

    /// The KDF output length in bytes: `length` when set, otherwise
    /// the algorithm's preferred key size.
    pub fn derived_key_len(&self) -> usize {
        if self.length > 0 {
            self.length
        } else {
            self.algorithm.key_len()
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let p = CipherParams::default();
        assert_eq!(p.algorithm, Algorithm::Aes256);
        assert_eq!(p.iterations, 10_000);
        assert_eq!(p.length, 32);
        assert_eq!(p.digest, Digest::Sha256);
        assert_eq!(p.encoding, Encoding::Hex);
        assert_eq!(p.format, OutputFormat::Raw);
        assert!(!p.uses_kdf());
    }

    #[test]
    fn algorithm_parses_all_variants() {
        for name in ["aes256", "aes192", "aes128", "des3", "rc4"] {
            let alg: Algorithm = name.parse().unwrap();
            assert_eq!(alg.to_string(), name);
        }
        assert!("aes512".parse::<Algorithm>().is_err());
    }

    #[test]
    fn unknown_format_is_invalid_format_error() {
        let err = "binary".parse::<OutputFormat>().unwrap_err();
        assert!(matches!(err, SealboxError::InvalidFormat(_)));
    }

    #[test]
    fn kdf_enabled_only_with_salt_and_iterations() {
        let mut p = CipherParams {
            salt: "pepper".into(),
            ..CipherParams::default()
        };
        assert!(p.uses_kdf());
        p.iterations = 0;
        assert!(!p.uses_kdf());
    }

    #[test]
    fn derived_key_len_falls_back_to_algorithm() {
        let p = CipherParams {
            algorithm: Algorithm::Des3,
            length: 0,
            ..CipherParams::default()
        };
        assert_eq!(p.derived_key_len(), 24);
    }
}
