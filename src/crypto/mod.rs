//! Cryptographic core of sealbox.
//!
//! This module provides:
//! - The parameter model: algorithm/digest/encoding/format enums and
//!   `CipherParams` with every documented default (`params`)
//! - PBKDF2 key material derivation (`kdf`)
//! - The pure encrypt/decrypt pipeline (`engine`)

pub mod engine;
pub mod kdf;
pub mod params;

// Re-export the most commonly used items so callers can write:
//   use sealbox::crypto::{encrypt, decrypt, CipherParams, ...};
pub use engine::{decrypt, encrypt};
pub use kdf::cipher_key_material;
pub use params::{
    Algorithm, CipherParams, Digest, Encoding, OutputFormat, DEFAULT_ITERATIONS,
    DEFAULT_KEY_LENGTH,
};
