//! Key-value backend seam.
//!
//! The relay treats its backing store as a TTL-aware key-value namespace:
//! each key holds the envelope string plus a small JSON metadata document,
//! and the backend forgets the key once its TTL has elapsed. The in-process
//! [`MemoryKv`](super::memory::MemoryKv) is the only backend shipped, but
//! anything that can honour this contract can sit behind [`KvStore`].

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Shortest TTL a backend accepts, in seconds.
pub const MIN_TTL_SECS: u64 = 60;

/// Backend failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("TTL of {0}s is below the {min}s minimum", min = MIN_TTL_SECS)]
    InvalidTtl(u64),

    #[error("Metadata serialization failed: {0}")]
    Serialization(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Options for a single write.
#[derive(Debug, Clone, PartialEq)]
pub struct PutOptions {
    /// Seconds until the backend may forget the key. Must be at least
    /// [`MIN_TTL_SECS`].
    pub expiration_ttl_secs: u64,
    /// Metadata returned alongside the value on reads.
    pub metadata: Option<Value>,
}

/// A live entry as returned by [`KvStore::get_with_metadata`].
#[derive(Debug, Clone, PartialEq)]
pub struct KvEntry {
    pub value: String,
    pub metadata: Option<Value>,
}

/// TTL-aware key-value namespace.
#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    /// Insert or overwrite `key`.
    async fn put(&self, key: &str, value: String, options: PutOptions) -> Result<(), StoreError>;

    /// Read `key` with its metadata. Keys past their TTL read as `None`.
    async fn get_with_metadata(&self, key: &str) -> Result<Option<KvEntry>, StoreError>;

    /// Remove `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Keys whose TTL has elapsed but which are still held.
    ///
    /// Backends that evict on their own report nothing.
    async fn expired_keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(Vec::new())
    }
}
