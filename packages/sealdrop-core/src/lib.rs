//! # SealDrop Core
//!
//! Client-side sealing for one-time secrets. A sender encrypts a message
//! under a password in its own environment and hands only the resulting
//! envelope to a relay; the receiver fetches the envelope and opens it
//! locally. The relay never sees plaintext, password, or sealed expiry.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            SEALDROP FLOW                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   Sender                     Relay                      Receiver       │
//! │   ──────                     ─────                      ────────       │
//! │   encrypt(msg, pw, exp)                                                 │
//! │        │  envelope                                                      │
//! │        └──────────────►  POST /api/create                               │
//! │                          store(id, envelope, ttl)                       │
//! │        ◄──────────────   {secretId}                                     │
//! │                                                                         │
//! │                          GET /api/secret/:id  ◄──────────               │
//! │                          (burn if readOnce)   ──────────► envelope     │
//! │                                                          decrypt(…, pw) │
//! │                                                          check expiry   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the codec
//! - [`crypto`] - Key derivation and the envelope codec
//! - [`payload`] - The `{message, expiry}` record sealed inside an envelope
//! - [`expiry`] - Expiry options shared by sender and relay
//! - [`api`] - JSON bodies of the relay's HTTP interface
//! - [`time`] - Millisecond clock for native and WASM targets

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod api;
pub mod crypto;
pub mod error;
pub mod expiry;
pub mod payload;
/// Platform-aware time utilities for native and WASM targets.
pub mod time;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use crypto::{decrypt, encrypt, Envelope};
pub use error::{Error, Result};
pub use expiry::ExpiryOption;
pub use payload::PlaintextRecord;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        // Each case pays for two 100k-round derivations.
        #![proptest_config(ProptestConfig::with_cases(6))]

        #[test]
        fn round_trip_recovers_message_and_expiry(
            message in "\\PC{0,64}",
            password in "\\PC{0,24}",
            expiry in proptest::option::of(0i64..4_102_444_800_000),
        ) {
            let sealed = encrypt(&message, &password, expiry).unwrap();
            let record = decrypt(&sealed, &password).unwrap();
            prop_assert_eq!(record.message, message);
            prop_assert_eq!(record.expiry, expiry);
        }

        #[test]
        fn other_password_never_opens(
            message in "\\PC{0,32}",
            password in "[a-z]{1,12}",
            suffix in "[A-Z0-9]{1,4}",
        ) {
            let sealed = encrypt(&message, &password, None).unwrap();
            let wrong = format!("{password}{suffix}");
            let err = decrypt(&sealed, &wrong).unwrap_err();
            prop_assert!(matches!(err, Error::AuthenticationFailed));
        }
    }
}
