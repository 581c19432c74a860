//! Key reference resolution.
//!
//! A key handed to any cipher operation is a free-text string that may
//! request indirection: `token:<id>` resolves through the token
//! collaborator, `config:<name>` through the configuration collaborator,
//! and anything else is a literal passphrase.  Resolution happens
//! freshly on every operation; the resolved value (never the reference)
//! is what ends up stored on a secret record.

use crate::errors::{Result, SealboxError};

/// Prefix requesting token-backed key material.
const TOKEN_PREFIX: &str = "token:";

/// Prefix requesting a configuration value as key material.
const CONFIG_PREFIX: &str = "config:";

/// External lookups the resolver delegates to.
///
/// Both return `Ok(None)` for "no such entry", which the resolver turns
/// into `KeyNotFound`.  Implementations live with the embedding
/// application; sealbox only defines the seam.
pub trait KeySource {
    /// Value of the token identified by `id`, if one exists.
    fn token_value(&self, id: &str) -> Result<Option<String>>;

    /// Value of the configuration entry named `name`, if set.
    fn config_value(&self, name: &str) -> Result<Option<String>>;
}

impl<T: KeySource + ?Sized> KeySource for std::sync::Arc<T> {
    fn token_value(&self, id: &str) -> Result<Option<String>> {
        (**self).token_value(id)
    }

    fn config_value(&self, name: &str) -> Result<Option<String>> {
        (**self).config_value(name)
    }
}

/// Resolves key references to concrete key material.
pub struct KeyResolver<S: KeySource> {
    source: S,
}

impl<S: KeySource> KeyResolver<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Resolve `reference` to the concrete key value.
    ///
    /// Fails with `KeyNotFound` when a prefixed reference points at a
    /// token or config entry that does not exist.
    pub fn resolve(&self, reference: &str) -> Result<String> {
        if let Some(id) = reference.strip_prefix(TOKEN_PREFIX) {
            return self
                .source
                .token_value(id)?
                .ok_or_else(|| SealboxError::KeyNotFound(reference.to_string()));
        }

        if let Some(name) = reference.strip_prefix(CONFIG_PREFIX) {
            return self
                .source
                .config_value(name)?
                .ok_or_else(|| SealboxError::KeyNotFound(reference.to_string()));
        }

        // Literal passphrase.
        Ok(reference.to_string())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
