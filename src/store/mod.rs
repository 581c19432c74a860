//! Secret store orchestration.
//!
//! `SecretStore` composes the key resolver, the cipher engine, and an
//! external `SecretBackend` into the create/get/update/delete/rotate
//! lifecycle.  It holds no state of its own beyond the default key
//! reference; every operation is an independent request over the
//! backend.
//!
//! Replace semantics: a secret is immutable once created.  `update` and
//! `rotate` delete the old record and insert a fresh one under the same
//! name.  That replace is not atomic at the storage boundary; a crash
//! between the two calls leaves the name absent (best-effort, see the
//! backend contract for the stronger primitive).

pub mod backend;
pub mod record;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use crate::crypto;
use crate::errors::{Result, SealboxError};
use crate::resolver::{KeyResolver, KeySource};

pub use backend::{MemorySecretBackend, SecretBackend};
pub use record::{EncryptRequest, SecretFilter, SecretRecord, SecretType};

use record::{normalize_name, validate_value};

/// Outcome of `rotate_all`: rotations are independent, so one bad
/// record never blocks the rest.  The aggregate call itself succeeds
/// and reports per-secret failures here.
#[derive(Debug, Default)]
pub struct RotationReport {
    pub rotated: Vec<SecretRecord>,
    pub failed: Vec<(String, SealboxError)>,
}

/// The main secret store handle.
pub struct SecretStore<B: SecretBackend, S: KeySource> {
    backend: B,
    resolver: KeyResolver<S>,
    default_key: String,
}

impl<B: SecretBackend, S: KeySource> SecretStore<B, S> {
    /// Build a store over `backend`, resolving key indirection through
    /// `source`.  `default_key` is the key reference used whenever a
    /// caller omits one.
    pub fn new(backend: B, source: S, default_key: impl Into<String>) -> Self {
        Self {
            backend,
            resolver: KeyResolver::new(source),
            default_key: default_key.into(),
        }
    }

    // ------------------------------------------------------------------
    // Create / read
    // ------------------------------------------------------------------

    /// Encrypt a value and persist it as a new named secret.
    ///
    /// The key reference is resolved freshly and the *resolved* value
    /// is stored on the record.  Fails with `AlreadyExists` when the
    /// name is taken; the backend's uniqueness constraint is the
    /// authoritative signal, the pre-check only short-circuits the
    /// cryptographic work.
    pub fn encrypt(&self, request: EncryptRequest) -> Result<SecretRecord> {
        let name = normalize_name(&request.name)?;
        validate_value(&request.value)?;

        if self.backend.find(&name)?.is_some() {
            return Err(SealboxError::AlreadyExists(name));
        }

        let reference = request.key.as_deref().unwrap_or(&self.default_key);
        let key = self.resolver.resolve(reference)?;

        let value = crypto::encrypt(&request.value, &key, &request.params)?;

        self.backend.insert(SecretRecord {
            name,
            value,
            description: request.description,
            tags: request.tags,
            kind: request.kind,
            params: request.params,
            key,
            expiration: request.expiration,
            created_at: Utc::now(),
        })
    }

    /// Decrypt a secret with a caller-supplied key reference (or the
    /// store default), resolved freshly.
    pub fn decrypt(&self, name: &str, key: Option<&str>) -> Result<String> {
        let name = normalize_name(name)?;
        let record = self.find_required(&name)?;

        let reference = key.unwrap_or(&self.default_key);
        let resolved = self.resolver.resolve(reference)?;

        crypto::decrypt(&record.value, &resolved, &record.params)
    }

    /// Fetch a secret record without decrypting it.
    pub fn get(&self, name: &str) -> Result<SecretRecord> {
        let name = normalize_name(name)?;
        self.find_required(&name)
    }

    /// Decrypt a secret with its own stored key.  No resolution
    /// happens; the stored key is already the resolved material.
    pub fn get_value(&self, name: &str) -> Result<String> {
        let name = normalize_name(name)?;
        let record = self.find_required(&name)?;
        crypto::decrypt(&record.value, &record.key, &record.params)
    }

    /// List records matching `filter`.
    pub fn list(&self, filter: &SecretFilter) -> Result<Vec<SecretRecord>> {
        self.backend.list(filter)
    }

    /// Decrypt every record matching `filter` with its own stored key.
    ///
    /// A record that fails to decrypt (corrupted value, inconsistent
    /// stored parameters) is skipped and logged; it does not abort the
    /// batch.
    pub fn list_values(&self, filter: &SecretFilter) -> Result<Vec<(String, String)>> {
        let records = self.backend.list(filter)?;
        let mut values = Vec::with_capacity(records.len());

        for record in records {
            match crypto::decrypt(&record.value, &record.key, &record.params) {
                Ok(plaintext) => values.push((record.name, plaintext)),
                Err(err) => {
                    log::warn!("skipping secret '{}': {err}", record.name);
                }
            }
        }

        Ok(values)
    }

    // ------------------------------------------------------------------
    // Update / delete
    // ------------------------------------------------------------------

    /// Replace a secret's value and/or metadata.
    ///
    /// The key reference is re-resolved; the value is re-encrypted
    /// under the record's *existing* cipher parameters, which are not
    /// caller-overridable.  When `value` is omitted, the current
    /// plaintext is recovered with the stored key and re-encrypted
    /// under the newly resolved key.
    ///
    /// `None` for `description` or `expiration` means "keep the stored
    /// value"; neither field can be cleared through this call.  To
    /// drop them, delete the secret and encrypt it again.
    pub fn update(
        &self,
        name: &str,
        value: Option<&str>,
        description: Option<&str>,
        key: Option<&str>,
        expiration: Option<DateTime<Utc>>,
    ) -> Result<SecretRecord> {
        let name = normalize_name(name)?;
        let found = self.find_required(&name)?;

        let reference = key.unwrap_or(&self.default_key);
        let resolved = self.resolver.resolve(reference)?;

        let plaintext = match value {
            Some(v) => {
                validate_value(v)?;
                Zeroizing::new(v.to_string())
            }
            None => Zeroizing::new(crypto::decrypt(&found.value, &found.key, &found.params)?),
        };

        let encrypted = crypto::encrypt(&plaintext, &resolved, &found.params)?;

        // Replace = delete + insert, same name.
        self.backend.remove(&name)?;
        self.backend.insert(SecretRecord {
            name,
            value: encrypted,
            description: description.map(str::to_string).or(found.description),
            tags: found.tags,
            kind: found.kind,
            params: found.params,
            key: resolved,
            expiration: expiration.or(found.expiration),
            created_at: Utc::now(),
        })
    }

    /// Delete a secret, returning the removed record.
    pub fn delete(&self, name: &str) -> Result<SecretRecord> {
        let name = normalize_name(name)?;
        self.backend
            .remove(&name)?
            .ok_or(SealboxError::NotFound(name))
    }

    /// Delete every secret, returning the removed records.
    pub fn delete_all(&self) -> Result<Vec<SecretRecord>> {
        self.backend.clear()
    }

    // ------------------------------------------------------------------
    // Rotation
    // ------------------------------------------------------------------

    /// Re-encrypt a secret under a new key without changing its
    /// plaintext or cipher parameters.
    ///
    /// Both references are resolved freshly.  Decryption must fully
    /// succeed before re-encryption is attempted, so a wrong old key
    /// can never corrupt the stored value.
    pub fn rotate(&self, name: &str, key: Option<&str>, new_key: Option<&str>) -> Result<SecretRecord> {
        let name = normalize_name(name)?;
        let found = self.find_required(&name)?;

        let old_resolved = self.resolver.resolve(key.unwrap_or(&self.default_key))?;
        let new_resolved = self.resolver.resolve(new_key.unwrap_or(&self.default_key))?;

        let plaintext = Zeroizing::new(crypto::decrypt(&found.value, &old_resolved, &found.params)?);
        let encrypted = crypto::encrypt(&plaintext, &new_resolved, &found.params)?;

        self.backend.remove(&name)?;
        self.backend.insert(SecretRecord {
            name,
            value: encrypted,
            description: found.description,
            tags: found.tags,
            kind: found.kind,
            params: found.params,
            key: new_resolved,
            expiration: found.expiration,
            created_at: Utc::now(),
        })
    }

    /// Rotate every stored secret from `key` to `new_key`.
    ///
    /// Each rotation is independent; failures are collected in the
    /// report alongside the successes.
    pub fn rotate_all(&self, key: Option<&str>, new_key: Option<&str>) -> Result<RotationReport> {
        let records = self.backend.list(&SecretFilter::default())?;
        let mut report = RotationReport::default();

        for record in records {
            match self.rotate(&record.name, key, new_key) {
                Ok(rotated) => report.rotated.push(rotated),
                Err(err) => {
                    log::warn!("rotation failed for secret '{}': {err}", record.name);
                    report.failed.push((record.name, err));
                }
            }
        }

        Ok(report)
    }

    // ------------------------------------------------------------------
    // Internal
    // ------------------------------------------------------------------

    fn find_required(&self, name: &str) -> Result<SecretRecord> {
        self.backend
            .find(name)?
            .ok_or_else(|| SealboxError::NotFound(name.to_string()))
    }
}
