//! In-process TTL key-value store.
//!
//! Entries carry an absolute expiry timestamp. Reads evict an entry lazily
//! once it has expired; the relay's sweep loop collects whatever nobody
//! reads again.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use sealdrop_core::time;

use super::kv::{KvEntry, KvStore, PutOptions, StoreError, MIN_TTL_SECS};

#[derive(Debug, Clone)]
struct StoredEntry {
    value: String,
    metadata: Option<Value>,
    /// Unix milliseconds after which the entry is gone.
    expires_at: i64,
}

impl StoredEntry {
    fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

/// DashMap-backed [`KvStore`].
#[derive(Clone, Default)]
pub struct MemoryKv {
    entries: Arc<DashMap<String, StoredEntry>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of held entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(super) fn put_at(
        &self,
        key: &str,
        value: String,
        options: PutOptions,
        now: i64,
    ) -> Result<(), StoreError> {
        if options.expiration_ttl_secs < MIN_TTL_SECS {
            return Err(StoreError::InvalidTtl(options.expiration_ttl_secs));
        }

        let ttl_ms = i64::try_from(options.expiration_ttl_secs.saturating_mul(1000))
            .unwrap_or(i64::MAX);
        self.entries.insert(
            key.to_string(),
            StoredEntry {
                value,
                metadata: options.metadata,
                expires_at: now.saturating_add(ttl_ms),
            },
        );
        Ok(())
    }

    fn get_at(&self, key: &str, now: i64) -> Option<KvEntry> {
        {
            let entry = self.entries.get(key)?;
            if !entry.is_expired_at(now) {
                return Some(KvEntry {
                    value: entry.value.clone(),
                    metadata: entry.metadata.clone(),
                });
            }
        }

        // The read guard is released above; removing while holding it deadlocks.
        self.entries.remove_if(key, |_, e| e.is_expired_at(now));
        None
    }

    fn expired_keys_at(&self, now: i64) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| entry.value().is_expired_at(now))
            .map(|entry| entry.key().clone())
            .collect()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn put(&self, key: &str, value: String, options: PutOptions) -> Result<(), StoreError> {
        self.put_at(key, value, options, time::now_millis())
    }

    async fn get_with_metadata(&self, key: &str) -> Result<Option<KvEntry>, StoreError> {
        Ok(self.get_at(key, time::now_millis()))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn expired_keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.expired_keys_at(time::now_millis()))
    }
}
