//! Storage seam for secret records.
//!
//! The document store behind a `SecretStore` is an external
//! collaborator.  Its uniqueness constraint on `name` is the
//! authoritative duplicate signal: `insert` must fail with
//! `AlreadyExists` on a name collision, because the store's own
//! check-then-create pre-check is inherently racy.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::errors::{Result, SealboxError};

use super::record::{SecretFilter, SecretRecord};

/// External document store abstraction for secrets.
pub trait SecretBackend {
    /// Persist a new record.  Fails with `AlreadyExists` when a record
    /// with the same name is already stored.
    fn insert(&self, record: SecretRecord) -> Result<SecretRecord>;

    /// Fetch a record by (normalized) name.
    fn find(&self, name: &str) -> Result<Option<SecretRecord>>;

    /// Delete a record by name, returning it if it existed.
    fn remove(&self, name: &str) -> Result<Option<SecretRecord>>;

    /// All records matching `filter`, sorted by name.
    fn list(&self, filter: &SecretFilter) -> Result<Vec<SecretRecord>>;

    /// Delete every record, returning the removed records.
    fn clear(&self) -> Result<Vec<SecretRecord>>;
}

/// In-memory backend used by tests and simple embeddings.
#[derive(Default)]
pub struct MemorySecretBackend {
    records: Mutex<HashMap<String, SecretRecord>>,
}

impl MemorySecretBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, SecretRecord>>> {
        self.records
            .lock()
            .map_err(|_| SealboxError::Storage("secret store mutex poisoned".into()))
    }
}

impl SecretBackend for MemorySecretBackend {
    fn insert(&self, record: SecretRecord) -> Result<SecretRecord> {
        let mut records = self.lock()?;
        if records.contains_key(&record.name) {
            return Err(SealboxError::AlreadyExists(record.name));
        }
        records.insert(record.name.clone(), record.clone());
        Ok(record)
    }

    fn find(&self, name: &str) -> Result<Option<SecretRecord>> {
        Ok(self.lock()?.get(name).cloned())
    }

    fn remove(&self, name: &str) -> Result<Option<SecretRecord>> {
        Ok(self.lock()?.remove(name))
    }

    fn list(&self, filter: &SecretFilter) -> Result<Vec<SecretRecord>> {
        let records = self.lock()?;
        let mut matched: Vec<SecretRecord> =
            records.values().filter(|r| filter.matches(r)).cloned().collect();
        matched.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matched)
    }

    fn clear(&self) -> Result<Vec<SecretRecord>> {
        let mut records = self.lock()?;
        let mut removed: Vec<SecretRecord> = records.drain().map(|(_, r)| r).collect();
        removed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(removed)
    }
}

impl<T: SecretBackend + ?Sized> SecretBackend for std::sync::Arc<T> {
    fn insert(&self, record: SecretRecord) -> Result<SecretRecord> {
        (**self).insert(record)
    }

    fn find(&self, name: &str) -> Result<Option<SecretRecord>> {
        (**self).find(name)
    }

    fn remove(&self, name: &str) -> Result<Option<SecretRecord>> {
        (**self).remove(name)
    }

    fn list(&self, filter: &SecretFilter) -> Result<Vec<SecretRecord>> {
        (**self).list(filter)
    }

    fn clear(&self) -> Result<Vec<SecretRecord>> {
        (**self).clear()
    }
}
