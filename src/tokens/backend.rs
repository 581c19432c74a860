//! Storage seam for token records.

use std::sync::Mutex;

use subtle::ConstantTimeEq;

use crate::errors::{Result, SealboxError};

use super::record::{TokenRecord, TokenType};

/// External document store abstraction for tokens.
///
/// Lookups are always by `(type, fingerprint)`; the plaintext token
/// never reaches this layer.
pub trait TokenBackend {
    /// Persist a new token record.
    fn insert(&self, record: TokenRecord) -> Result<TokenRecord>;

    /// Fetch a record by type and fingerprint.
    fn find(&self, kind: TokenType, fingerprint: &str) -> Result<Option<TokenRecord>>;

    /// Set `last_used_at` on a record, returning the updated record.
    fn touch(&self, kind: TokenType, fingerprint: &str, at: i64) -> Result<Option<TokenRecord>>;

    /// Delete a record, returning it if it existed.
    fn remove(&self, kind: TokenType, fingerprint: &str) -> Result<Option<TokenRecord>>;

    /// Delete every record whose expiry is strictly before `cutoff`
    /// (epoch ms).  Returns the number removed.
    fn remove_expired(&self, cutoff: i64) -> Result<usize>;
}

/// In-memory backend used by tests and simple embeddings.
///
/// Fingerprints are compared in constant time.  The HMAC construction
/// already blinds the raw token, but a scan over stored digests should
/// not leak match positions either.
#[derive(Default)]
pub struct MemoryTokenBackend {
    records: Mutex<Vec<TokenRecord>>,
}

impl MemoryTokenBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<TokenRecord>>> {
        self.records
            .lock()
            .map_err(|_| SealboxError::Storage("token store mutex poisoned".into()))
    }
}

fn matches(record: &TokenRecord, kind: TokenType, fingerprint: &str) -> bool {
    record.kind == kind
        && record
            .token
            .as_bytes()
            .ct_eq(fingerprint.as_bytes())
            .into()
}

impl TokenBackend for MemoryTokenBackend {
    fn insert(&self, record: TokenRecord) -> Result<TokenRecord> {
        self.lock()?.push(record.clone());
        Ok(record)
    }

    fn find(&self, kind: TokenType, fingerprint: &str) -> Result<Option<TokenRecord>> {
        let records = self.lock()?;
        Ok(records.iter().find(|r| matches(r, kind, fingerprint)).cloned())
    }

    fn touch(&self, kind: TokenType, fingerprint: &str, at: i64) -> Result<Option<TokenRecord>> {
        let mut records = self.lock()?;
        let record = records.iter_mut().find(|r| matches(r, kind, fingerprint));
        Ok(record.map(|r| {
            r.last_used_at = Some(at);
            r.clone()
        }))
    }

    fn remove(&self, kind: TokenType, fingerprint: &str) -> Result<Option<TokenRecord>> {
        let mut records = self.lock()?;
        match records.iter().position(|r| matches(r, kind, fingerprint)) {
            Some(index) => Ok(Some(records.swap_remove(index))),
            None => Ok(None),
        }
    }

    fn remove_expired(&self, cutoff: i64) -> Result<usize> {
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|r| !r.expired_at(cutoff));
        Ok(before - records.len())
    }
}

impl<T: TokenBackend + ?Sized> TokenBackend for std::sync::Arc<T> {
    fn insert(&self, record: TokenRecord) -> Result<TokenRecord> {
        (**self).insert(record)
    }

    fn find(&self, kind: TokenType, fingerprint: &str) -> Result<Option<TokenRecord>> {
        (**self).find(kind, fingerprint)
    }

    fn touch(&self, kind: TokenType, fingerprint: &str, at: i64) -> Result<Option<TokenRecord>> {
        (**self).touch(kind, fingerprint, at)
    }

    fn remove(&self, kind: TokenType, fingerprint: &str) -> Result<Option<TokenRecord>> {
        (**self).remove(kind, fingerprint)
    }

    fn remove_expired(&self, cutoff: i64) -> Result<usize> {
        (**self).remove_expired(cutoff)
    }
}
