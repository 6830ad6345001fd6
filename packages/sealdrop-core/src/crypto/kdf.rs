//! # Password Key Derivation
//!
//! Stretches a sender-chosen password into two independent 256-bit keys.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    PASSWORD → ENVELOPE KEYS                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  PBKDF2-HMAC-SHA256(                                                   │
//! │    password   = utf-8 bytes of the password,                           │
//! │    salt       = 16 random bytes (stored in the envelope),              │
//! │    iterations = 100,000,                                               │
//! │    output     = 64 bytes                                               │
//! │  )                                                                     │
//! │                          │                                              │
//! │            ┌─────────────┴─────────────┐                               │
//! │            ▼                           ▼                               │
//! │  ┌───────────────────┐       ┌───────────────────┐                    │
//! │  │ bytes [0..32)     │       │ bytes [32..64)    │                    │
//! │  │ AES-256-CBC key   │       │ HMAC-SHA256 key   │                    │
//! │  └───────────────────┘       └───────────────────┘                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Aspect | Choice |
//! |--------|--------|
//! | KDF | PBKDF2-HMAC-SHA256, 100k rounds |
//! | Key separation | Disjoint halves of one derivation |
//! | Lifetime | Zeroized on drop, never persisted |

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// PBKDF2 iteration count. Fixed: changing it breaks every existing envelope.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length in bytes
pub const SALT_SIZE: usize = 16;

/// Total derived key material in bytes (512 bits)
pub const DERIVED_KEY_SIZE: usize = 64;

/// AES-256 key length in bytes
pub const ENCRYPTION_KEY_SIZE: usize = 32;

/// HMAC-SHA256 key length in bytes
pub const MAC_KEY_SIZE: usize = DERIVED_KEY_SIZE - ENCRYPTION_KEY_SIZE;

/// Encryption and authentication keys derived from one password + salt
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKeys {
    encryption_key: [u8; ENCRYPTION_KEY_SIZE],
    mac_key: [u8; MAC_KEY_SIZE],
}

impl DerivedKeys {
    /// Split 512 bits of key material into its two halves
    pub fn from_material(material: &[u8; DERIVED_KEY_SIZE]) -> Self {
        let mut encryption_key = [0u8; ENCRYPTION_KEY_SIZE];
        let mut mac_key = [0u8; MAC_KEY_SIZE];
        encryption_key.copy_from_slice(&material[..ENCRYPTION_KEY_SIZE]);
        mac_key.copy_from_slice(&material[ENCRYPTION_KEY_SIZE..]);

        Self {
            encryption_key,
            mac_key,
        }
    }

    /// AES-256-CBC key (first half)
    pub fn encryption_key(&self) -> &[u8; ENCRYPTION_KEY_SIZE] {
        &self.encryption_key
    }

    /// HMAC-SHA256 key (second half)
    pub fn mac_key(&self) -> &[u8; MAC_KEY_SIZE] {
        &self.mac_key
    }
}

/// Derive the envelope keys for `password` and `salt`
///
/// Deterministic: the receiver re-derives the same pair from the salt carried
/// in the envelope.
pub fn derive_keys(password: &[u8], salt: &[u8]) -> DerivedKeys {
    let mut material = [0u8; DERIVED_KEY_SIZE];
    pbkdf2_hmac::<Sha256>(password, salt, PBKDF2_ITERATIONS, &mut material);

    let keys = DerivedKeys::from_material(&material);
    material.zeroize();

    tracing::trace!(rounds = PBKDF2_ITERATIONS, "Derived envelope keys");
    keys
}

// ============================================================================
// TESTS
// ============================================================================
