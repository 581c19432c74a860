use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crypto::params::Algorithm;
use crate::errors::{Result, SealboxError};

/// Environment variable consulted when `tokens.salt` is not set in the
/// config file.
const TOKEN_SALT_ENV: &str = "SEALBOX_TOKEN_SALT";

/// Process-level configuration, loaded from `.sealbox.toml`.
///
/// The secrets defaults are overridable per call; the token salt is a
/// hard startup dependency with no default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Defaults applied when an encrypt/decrypt call omits a field.
    #[serde(default)]
    pub secrets: SecretsSettings,

    /// Token subsystem configuration.
    #[serde(default)]
    pub tokens: TokensSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsSettings {
    /// Default cipher algorithm (default: aes256).
    #[serde(default)]
    pub algorithm: Algorithm,

    /// Default key reference used when a caller supplies none.
    /// Change this before storing anything real.
    #[serde(default = "default_key")]
    pub key: String,
}

fn default_key() -> String {
    "password".to_string()
}

impl Default for SecretsSettings {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            key: default_key(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokensSettings {
    /// HMAC salt for token fingerprints.  Required: `TokenService`
    /// construction fails without it.
    #[serde(default)]
    pub salt: Option<String>,
}

impl Settings {
    /// Name of the config file we look for.
    const FILE_NAME: &'static str = ".sealbox.toml";

    /// Load settings from `<dir>/.sealbox.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            SealboxError::Config(format!("failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// The token fingerprint salt, from the config file or the
    /// `SEALBOX_TOKEN_SALT` environment variable.
    ///
    /// Missing salt is a fatal startup condition: callers should
    /// propagate this error out of process initialization instead of
    /// serving traffic.
    pub fn require_token_salt(&self) -> Result<String> {
        if let Some(salt) = &self.tokens.salt {
            if !salt.is_empty() {
                return Ok(salt.clone());
            }
        }
        match std::env::var(TOKEN_SALT_ENV) {
            Ok(salt) if !salt.is_empty() => Ok(salt),
            _ => Err(SealboxError::Config(format!(
                "token salt must be configured (tokens.salt in {} or {TOKEN_SALT_ENV})",
                Self::FILE_NAME
            ))),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
