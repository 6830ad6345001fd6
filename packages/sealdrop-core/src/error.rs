//! # Error Handling
//!
//! Error types for the SealDrop envelope codec.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Crypto Errors                                                     │
//! │  │   ├── EncryptionFailed      - Cipher setup/encryption failed        │
//! │  │   ├── MalformedEnvelope     - Envelope string is structurally bad   │
//! │  │   ├── AuthenticationFailed  - MAC mismatch (usually wrong password) │
//! │  │   └── InvalidPadding        - PKCS#7 padding is malformed           │
//! │  │                                                                      │
//! │  ├── Payload Errors                                                    │
//! │  │   └── MalformedPayload      - Decrypted record is not well-formed   │
//! │  │                                                                      │
//! │  └── Internal Errors                                                   │
//! │      └── SerializationError    - Record could not be serialized        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Oracle Resistance
//!
//! `AuthenticationFailed` carries no detail. Every failure past the structural
//! parse but before the MAC verifies (wrong password, flipped bits, swapped
//! iv) collapses into the same variant.

use thiserror::Error;

/// Result type alias for SealDrop Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for SealDrop Core
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Crypto Errors (300-399)
    // ========================================================================

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Envelope does not have the `salt.iv.ciphertext.mac` shape
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// MAC verification failed
    #[error("Authentication failed. The password is wrong or the secret was altered.")]
    AuthenticationFailed,

    /// Ciphertext authenticated but its padding is invalid
    #[error("Invalid padding in decrypted data.")]
    InvalidPadding,

    // ========================================================================
    // Payload Errors (700-799)
    // ========================================================================

    /// Decrypted record is not the expected `{message, expiry}` document
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Get the numeric error code
    ///
    /// Error codes are organized by category:
    /// - 300-399: Crypto
    /// - 700-799: Payload
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            // Crypto (300-399)
            Error::EncryptionFailed(_) => 300,
            Error::MalformedEnvelope(_) => 301,
            Error::AuthenticationFailed => 302,
            Error::InvalidPadding => 303,

            // Payload (700-799)
            Error::MalformedPayload(_) => 700,

            // Internal (900-999)
            Error::SerializationError(_) => 900,
        }
    }

    /// Check if this error requires user action
    ///
    /// A MAC mismatch is the normal outcome of a mistyped password, so the
    /// caller should prompt again rather than report corruption.
    pub fn requires_user_action(&self) -> bool {
        matches!(self, Error::AuthenticationFailed)
    }

    /// Check if the envelope itself is corrupt (as opposed to a bad password)
    pub fn is_corrupt_envelope(&self) -> bool {
        matches!(
            self,
            Error::MalformedEnvelope(_) | Error::InvalidPadding | Error::MalformedPayload(_)
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================
