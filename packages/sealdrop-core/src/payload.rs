//! The plaintext record sealed inside every envelope.
//!
//! The sender's expiry travels inside the ciphertext, under the MAC, so the
//! relay never learns it and nobody can extend it without the password.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// `{message, expiry}` as sealed by the sender
///
/// Canonical text form is compact JSON with `expiry` always present:
/// `{"message":"hi","expiry":null}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaintextRecord {
    /// The secret text
    pub message: String,
    /// Unix milliseconds after which the receiver should refuse the message
    pub expiry: Option<i64>,
}

impl PlaintextRecord {
    /// Create a record
    pub fn new(message: impl Into<String>, expiry: Option<i64>) -> Self {
        Self {
            message: message.into(),
            expiry,
        }
    }

    /// Serialize to the canonical byte form that gets encrypted
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse decrypted bytes back into a record
    pub fn from_canonical_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| Error::MalformedPayload(e.to_string()))
    }

    /// Whether the sealed expiry has passed at `now_millis`
    ///
    /// The codec never enforces this; receivers call it after decrypting.
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        self.expiry.is_some_and(|expiry| now_millis > expiry)
    }
}
