//! Ephemeral secret storage.
//!
//! [`SecretStore`] sits between the HTTP handlers and a [`KvStore`]
//! backend. It validates input, mints ids, maps expiry options to TTLs and
//! retires read-once secrets after their first fetch.
//!
//! ## Read-once
//!
//! The fetch that wins a read-once secret marks the id as burning before it
//! returns, then deletes the record in a background task. Later fetches in
//! this process see the mark and get `NotFound` even while the delete is in
//! flight. The mark is process-local: two relays sharing one backend can
//! both serve the same read-once secret if their fetches overlap.

pub mod id;
pub mod kv;
pub mod lifetime;
pub mod memory;

use std::sync::Arc;

use dashmap::DashMap;
use sealdrop_core::api::{FetchSecretResponse, SecretMetadata};
use sealdrop_core::expiry::ExpiryOption;
use sealdrop_core::time;

use crate::error::SecretError;
use id::{IdSource, OsRngIds};
use kv::{KvStore, PutOptions, StoreError};
use lifetime::{Lifetime, Retirement, READ_ONCE_TTL_SECS};

/// Largest accepted envelope, counted in Unicode scalar values (`char`s),
/// not UTF-16 code units.
pub const MAX_PAYLOAD_CHARS: usize = 2_000_000;

/// Longest id accepted on fetch, in characters.
pub const MAX_ID_CHARS: usize = 32;

/// A secret as handed back to a reader.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSecret {
    pub encrypted_payload: String,
    pub metadata: SecretMetadata,
}

impl From<StoredSecret> for FetchSecretResponse {
    fn from(secret: StoredSecret) -> Self {
        FetchSecretResponse {
            encrypted_payload: secret.encrypted_payload,
            metadata: secret.metadata,
        }
    }
}

/// Shared handle to the secret store.
#[derive(Clone)]
pub struct SecretStore {
    kv: Arc<dyn KvStore>,
    ids: Arc<dyn IdSource>,
    /// Id → unix millis when its read-once fetch was won.
    burning: Arc<DashMap<String, i64>>,
}

impl SecretStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self::with_id_source(kv, Arc::new(OsRngIds))
    }

    pub fn with_id_source(kv: Arc<dyn KvStore>, ids: Arc<dyn IdSource>) -> Self {
        Self {
            kv,
            ids,
            burning: Arc::new(DashMap::new()),
        }
    }

    /// Store an envelope and return its new id.
    ///
    /// The payload is stored verbatim; the relay never inspects it.
    pub async fn create(
        &self,
        payload: &str,
        read_once: bool,
        expiry_option: Option<ExpiryOption>,
    ) -> Result<String, SecretError> {
        validate_payload(payload)?;

        let lifetime = Lifetime::for_request(read_once, expiry_option.as_ref());
        let metadata = SecretMetadata {
            read_once,
            creation_time: time::now_millis(),
            user_expiry_option: expiry_option,
        };

        let id = self.ids.next_id();
        self.kv
            .put(
                &id,
                payload.to_string(),
                PutOptions {
                    expiration_ttl_secs: lifetime.ttl_secs(),
                    metadata: Some(serde_json::to_value(&metadata).map_err(StoreError::from)?),
                },
            )
            .await?;

        tracing::info!(
            secret_id = id.as_str(),
            read_once,
            ttl_secs = lifetime.ttl_secs(),
            "Secret stored"
        );
        Ok(id)
    }

    /// Fetch a secret by id. A read-once secret is retired as a side effect.
    pub async fn fetch(&self, id: &str) -> Result<StoredSecret, SecretError> {
        validate_id(id)?;

        if self.burning.contains_key(id) {
            return Err(SecretError::NotFound);
        }

        let entry = self
            .kv
            .get_with_metadata(id)
            .await?
            .ok_or(SecretError::NotFound)?;

        let metadata: SecretMetadata = match entry.metadata {
            Some(value) => serde_json::from_value(value).map_err(StoreError::from)?,
            None => {
                return Err(StoreError::Serialization(format!("secret {id} has no metadata")).into())
            }
        };

        if metadata.read_once {
            if self
                .burning
                .insert(id.to_string(), time::now_millis())
                .is_some()
            {
                return Err(SecretError::NotFound);
            }
            self.retire_in_background(id, Retirement::Consumed);
        }

        tracing::info!(secret_id = id, read_once = metadata.read_once, "Secret fetched");
        Ok(StoredSecret {
            encrypted_payload: entry.value,
            metadata,
        })
    }

    /// Delete a secret from the backend.
    ///
    /// On success the burning mark is cleared; on failure it stays so this
    /// process keeps refusing the id until the sweep drops the mark.
    pub async fn retire(&self, id: &str, reason: Retirement) -> Result<(), SecretError> {
        match self.kv.delete(id).await {
            Ok(()) => {
                self.burning.remove(id);
                tracing::debug!(secret_id = id, reason = reason.as_str(), "Secret retired");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    secret_id = id,
                    reason = reason.as_str(),
                    error = %e,
                    "Failed to retire secret"
                );
                Err(e.into())
            }
        }
    }

    fn retire_in_background(&self, id: &str, reason: Retirement) {
        let store = self.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            // Failure is logged inside `retire`; the reader already has the secret.
            let _ = store.retire(&id, reason).await;
        });
    }

    /// Retire every secret whose TTL has elapsed and drop stale burning
    /// marks. Returns how many secrets were retired.
    pub async fn sweep(&self) -> Result<usize, SecretError> {
        let expired = self.kv.expired_keys().await?;

        let mut retired = 0usize;
        for id in &expired {
            if self.retire(id, Retirement::Elapsed).await.is_ok() {
                retired += 1;
            }
        }

        let cutoff = time::now_millis().saturating_sub(READ_ONCE_TTL_SECS as i64 * 1000);
        self.burning.retain(|_, marked_at| *marked_at > cutoff);

        if retired > 0 {
            tracing::debug!(count = retired, "Swept expired secrets");
        }
        Ok(retired)
    }

    /// Ids currently marked as burning.
    pub fn burning_count(&self) -> usize {
        self.burning.len()
    }
}

fn validate_payload(payload: &str) -> Result<(), SecretError> {
    if payload.is_empty() {
        return Err(SecretError::PayloadRequired);
    }
    let length = payload.chars().count();
    if length > MAX_PAYLOAD_CHARS {
        return Err(SecretError::PayloadTooLarge {
            length,
            max: MAX_PAYLOAD_CHARS,
        });
    }
    Ok(())
}

fn validate_id(id: &str) -> Result<(), SecretError> {
    if id.is_empty() || id.chars().count() > MAX_ID_CHARS {
        return Err(SecretError::InvalidId);
    }
    Ok(())
}
