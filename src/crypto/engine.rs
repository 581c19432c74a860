//! Parameterized symmetric encryption and decryption.
//!
//! Both functions are pure: identical inputs always produce identical
//! output.  Uniqueness across calls is the caller's job, by varying the
//! IV or salt.
//!
//! Pipeline for `encrypt`:
//!   1. key material (PBKDF2 when salt + iterations are set)
//!   2. raw cipher (AES-CBC / 3DES-CBC with PKCS7 padding, or RC4)
//!   3. intermediate text encoding (hex / base64 / utf8)
//!   4. outer output format (raw and utf8 pass through, hex and base64
//!      wrap the encoded text once more)
//!
//! `decrypt` reverses the layers in the opposite order and wraps every
//! low-level failure (bad pad, wrong key size, malformed encoding) as
//! `DecryptionFailed` so callers never see a raw crypto-crate error.

use aes::{Aes128, Aes192, Aes256};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use des::TdesEde3;
use rc4::consts::{U16, U24, U32};
use rc4::{KeyInit, Rc4, StreamCipher};

use crate::errors::{Result, SealboxError};

use super::kdf::cipher_key_material;
use super::params::{Algorithm, CipherParams, Encoding, OutputFormat};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type Aes192CbcEnc = cbc::Encryptor<Aes192>;
type Aes192CbcDec = cbc::Decryptor<Aes192>;
type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type Des3CbcEnc = cbc::Encryptor<TdesEde3>;
type Des3CbcDec = cbc::Decryptor<TdesEde3>;

/// Encrypt `plaintext` with `key` under the given parameter set.
///
/// Returns the ciphertext in its final `format` representation.
pub fn encrypt(plaintext: &str, key: &str, params: &CipherParams) -> Result<String> {
    let key_material = cipher_key_material(key, params)?;

    let raw = run_cipher(params, &key_material, plaintext.as_bytes(), Direction::Encrypt)
        .map_err(SealboxError::EncryptionFailed)?;

    let encoded =
        encode_bytes(&raw, params.encoding).map_err(SealboxError::EncryptionFailed)?;

    Ok(apply_format(encoded, params.format))
}

/// Decrypt a ciphertext produced by [`encrypt`] with the same parameters.
///
/// Returns the UTF-8 plaintext.
pub fn decrypt(ciphertext: &str, key: &str, params: &CipherParams) -> Result<String> {
    let key_material = cipher_key_material(key, params)?;

    let encoded = strip_format(ciphertext, params.format).map_err(SealboxError::DecryptionFailed)?;

    let raw = decode_text(&encoded, params.encoding).map_err(SealboxError::DecryptionFailed)?;

    let plain = run_cipher(params, &key_material, &raw, Direction::Decrypt)
        .map_err(SealboxError::DecryptionFailed)?;

    String::from_utf8(plain)
        .map_err(|_| SealboxError::DecryptionFailed("plaintext is not valid UTF-8".into()))
}

// ---------------------------------------------------------------------------
// Raw cipher layer
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq)]
enum Direction {
    Encrypt,
    Decrypt,
}

/// Run the selected cipher over `data`.  Errors are plain strings; the
/// public entry points wrap them in the right domain error.
fn run_cipher(
    params: &CipherParams,
    key: &[u8],
    data: &[u8],
    dir: Direction,
) -> std::result::Result<Vec<u8>, String> {
    let alg = params.algorithm;

    if let Some(want_iv) = alg.iv_len() {
        // Block ciphers never get a silently defaulted IV.
        if params.iv.is_empty() {
            return Err(format!("{alg} requires a {want_iv}-byte iv"));
        }
        if params.iv.len() != want_iv {
            return Err(format!(
                "{alg} requires a {want_iv}-byte iv (got {})",
                params.iv.len()
            ));
        }
        let want_key = alg.key_len();
        if key.len() != want_key {
            return Err(format!(
                "{alg} requires a {want_key}-byte key (got {})",
                key.len()
            ));
        }
    }

    let iv = params.iv.as_bytes();

    match (alg, dir) {
        (Algorithm::Aes256, Direction::Encrypt) => Ok(Aes256CbcEnc::new_from_slices(key, iv)
            .map_err(|e| e.to_string())?
            .encrypt_padded_vec_mut::<Pkcs7>(data)),
        (Algorithm::Aes256, Direction::Decrypt) => Aes256CbcDec::new_from_slices(key, iv)
            .map_err(|e| e.to_string())?
            .decrypt_padded_vec_mut::<Pkcs7>(data)
            .map_err(|e| e.to_string()),
        (Algorithm::Aes192, Direction::Encrypt) => Ok(Aes192CbcEnc::new_from_slices(key, iv)
            .map_err(|e| e.to_string())?
            .encrypt_padded_vec_mut::<Pkcs7>(data)),
        (Algorithm::Aes192, Direction::Decrypt) => Aes192CbcDec::new_from_slices(key, iv)
            .map_err(|e| e.to_string())?
            .decrypt_padded_vec_mut::<Pkcs7>(data)
            .map_err(|e| e.to_string()),
        (Algorithm::Aes128, Direction::Encrypt) => Ok(Aes128CbcEnc::new_from_slices(key, iv)
            .map_err(|e| e.to_string())?
            .encrypt_padded_vec_mut::<Pkcs7>(data)),
        (Algorithm::Aes128, Direction::Decrypt) => Aes128CbcDec::new_from_slices(key, iv)
            .map_err(|e| e.to_string())?
            .decrypt_padded_vec_mut::<Pkcs7>(data)
            .map_err(|e| e.to_string()),
        (Algorithm::Des3, Direction::Encrypt) => Ok(Des3CbcEnc::new_from_slices(key, iv)
            .map_err(|e| e.to_string())?
            .encrypt_padded_vec_mut::<Pkcs7>(data)),
        (Algorithm::Des3, Direction::Decrypt) => Des3CbcDec::new_from_slices(key, iv)
            .map_err(|e| e.to_string())?
            .decrypt_padded_vec_mut::<Pkcs7>(data)
            .map_err(|e| e.to_string()),
        // RC4 is its own inverse, so both directions share the keystream.
        (Algorithm::Rc4, _) => rc4_apply(key, data),
    }
}

/// Apply the RC4 keystream.  The rc4 crate types the key length, so we
/// dispatch over the sizes the KDF can produce.
fn rc4_apply(key: &[u8], data: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let mut buf = data.to_vec();
    match key.len() {
        16 => {
            let mut cipher = Rc4::<U16>::new_from_slice(key).map_err(|e| e.to_string())?;
            cipher.apply_keystream(&mut buf);
        }
        24 => {
            let mut cipher = Rc4::<U24>::new_from_slice(key).map_err(|e| e.to_string())?;
            cipher.apply_keystream(&mut buf);
        }
        32 => {
            let mut cipher = Rc4::<U32>::new_from_slice(key).map_err(|e| e.to_string())?;
            cipher.apply_keystream(&mut buf);
        }
        n => return Err(format!("rc4 key must be 16, 24, or 32 bytes (got {n})")),
    }
    Ok(buf)
}

// ---------------------------------------------------------------------------
// Encoding and format layers
// ---------------------------------------------------------------------------

/// Ciphertext bytes -> intermediate text per `encoding`.
fn encode_bytes(bytes: &[u8], encoding: Encoding) -> std::result::Result<String, String> {
    match encoding {
        Encoding::Hex => Ok(hex::encode(bytes)),
        Encoding::Base64 => Ok(BASE64.encode(bytes)),
        Encoding::Utf8 => String::from_utf8(bytes.to_vec())
            .map_err(|_| "ciphertext is not valid UTF-8; use hex or base64 encoding".to_string()),
    }
}

/// Intermediate text -> ciphertext bytes, inverse of `encode_bytes`.
fn decode_text(text: &str, encoding: Encoding) -> std::result::Result<Vec<u8>, String> {
    match encoding {
        Encoding::Hex => hex::decode(text).map_err(|e| format!("invalid hex ciphertext: {e}")),
        Encoding::Base64 => BASE64
            .decode(text)
            .map_err(|e| format!("invalid base64 ciphertext: {e}")),
        Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
    }
}

/// Wrap the encoded text in its final outer representation.
fn apply_format(encoded: String, format: OutputFormat) -> String {
    match format {
        OutputFormat::Raw | OutputFormat::Utf8 => encoded,
        OutputFormat::Hex => hex::encode(encoded.as_bytes()),
        OutputFormat::Base64 => BASE64.encode(encoded.as_bytes()),
    }
}

/// Peel the outer representation back off, inverse of `apply_format`.
fn strip_format(text: &str, format: OutputFormat) -> std::result::Result<String, String> {
    match format {
        OutputFormat::Raw | OutputFormat::Utf8 => Ok(text.to_string()),
        OutputFormat::Hex => {
            let bytes = hex::decode(text).map_err(|e| format!("invalid hex format layer: {e}"))?;
            String::from_utf8(bytes).map_err(|_| "hex format layer is not valid UTF-8".to_string())
        }
        OutputFormat::Base64 => {
            let bytes = BASE64
                .decode(text)
                .map_err(|e| format!("invalid base64 format layer: {e}"))?;
            String::from_utf8(bytes)
                .map_err(|_| "base64 format layer is not valid UTF-8".to_string())
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_layers_invert() {
        for fmt in [
            OutputFormat::Raw,
            OutputFormat::Hex,
            OutputFormat::Base64,
            OutputFormat::Utf8,
        ] {
            let wrapped = apply_format("deadbeef".to_string(), fmt);
            assert_eq!(strip_format(&wrapped, fmt).unwrap(), "deadbeef");
        }
    }

    #[test]
    fn encoding_layers_invert() {
        let bytes = [0x00u8, 0xFF, 0x10, 0x7F];
        for enc in [Encoding::Hex, Encoding::Base64] {
            let text = encode_bytes(&bytes, enc).unwrap();
            assert_eq!(decode_text(&text, enc).unwrap(), bytes);
        }
    }

    #[test]
    fn utf8_encoding_rejects_binary_ciphertext() {
        let err = encode_bytes(&[0xC3, 0x28], Encoding::Utf8).unwrap_err();
        assert!(err.contains("UTF-8"));
    }

    #[test]
    fn block_cipher_without_iv_fails() {
        let params = CipherParams::default();
        let err = encrypt("hello world", "0123456789abcdef0123456789abcdef", &params).unwrap_err();
        assert!(matches!(err, SealboxError::EncryptionFailed(_)));
    }
}
