//! # Cryptography Module
//!
//! The password-sealed envelope used for every SealDrop secret.
//!
//! ## Security Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CRYPTOGRAPHIC ARCHITECTURE                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Password (sender-chosen, shared out of band)                          │
//! │            │                                                            │
//! │            ▼                                                            │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │     PBKDF2-HMAC-SHA256, 100k rounds, 16-byte random salt        │   │
//! │  │                     → 512 bits of key material                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │            │                                                            │
//! │     ┌──────┴───────┐                                                    │
//! │     ▼              ▼                                                    │
//! │  AES-256-CBC    HMAC-SHA256                                            │
//! │  (PKCS#7)       over iv ‖ ciphertext                                   │
//! │                                                                         │
//! │  Envelope = salt . iv . ciphertext . mac   (base64 fields)             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Algorithm Choices & Rationale
//!
//! | Algorithm | Purpose |
//! |-----------|---------|
//! | PBKDF2-SHA256 | Slow offline guessing of the password |
//! | AES-256-CBC | Confidentiality of the sealed record |
//! | HMAC-SHA256 | Integrity, checked before any decryption |
//!
//! ## Security Considerations
//!
//! 1. **Encrypt-then-MAC**: the MAC gate runs first on every decrypt path
//! 2. **Constant-time compare**: `hmac`'s `verify_slice`
//! 3. **Key separation**: encryption and MAC keys are disjoint halves
//! 4. **Key zeroization**: derived keys and plaintext buffers are wiped on drop
//! 5. **Secure random**: salt and iv come from `OsRng`, independently

mod envelope;
mod kdf;

pub use envelope::{
    decrypt, encrypt, open_envelope, seal_record, Envelope, BLOCK_SIZE, DELIMITER, IV_SIZE,
    MAC_SIZE,
};
pub use kdf::{
    derive_keys, DerivedKeys, DERIVED_KEY_SIZE, ENCRYPTION_KEY_SIZE, MAC_KEY_SIZE,
    PBKDF2_ITERATIONS, SALT_SIZE,
};
