//! Key material preparation for the cipher engine.
//!
//! When a parameter set carries a salt and an iteration count, the
//! caller's key string is stretched with PBKDF2-HMAC under the selected
//! digest before it touches a cipher.  Without a salt the key string's
//! bytes are used as-is and must already be the exact key size.

use md5::Md5;
use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use zeroize::Zeroizing;

use crate::errors::{Result, SealboxError};

use super::params::{CipherParams, Digest};

/// Produce the raw key bytes for one cipher operation.
///
/// The same key + salt + iterations + digest always produce the same
/// bytes.  The returned buffer is zeroized on drop.
pub fn cipher_key_material(key: &str, params: &CipherParams) -> Result<Zeroizing<Vec<u8>>> {
    if key.is_empty() {
        return Err(SealboxError::KeyDerivationFailed(
            "key must not be empty".into(),
        ));
    }

    if !params.uses_kdf() {
        return Ok(Zeroizing::new(key.as_bytes().to_vec()));
    }

    let out_len = params.derived_key_len();
    if out_len == 0 {
        return Err(SealboxError::KeyDerivationFailed(
            "derived key length must be at least 1 byte".into(),
        ));
    }

    let mut out = Zeroizing::new(vec![0u8; out_len]);
    let password = key.as_bytes();
    let salt = params.salt.as_bytes();

    match params.digest {
        Digest::Sha256 => pbkdf2_hmac::<Sha256>(password, salt, params.iterations, &mut out),
        Digest::Sha512 => pbkdf2_hmac::<Sha512>(password, salt, params.iterations, &mut out),
        Digest::Sha1 => pbkdf2_hmac::<Sha1>(password, salt, params.iterations, &mut out),
        Digest::Md5 => pbkdf2_hmac::<Md5>(password, salt, params.iterations, &mut out),
    }

    Ok(out)
}

// ── Tests ────────────────────────────────────────────────────────────
