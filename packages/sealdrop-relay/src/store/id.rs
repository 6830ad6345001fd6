//! Secret identifiers.
//!
//! Ids are 16 characters drawn uniformly from `[A-Za-z0-9]`, about 95 bits
//! of entropy. They are the only capability a reader needs, so they must
//! come from a cryptographic source in production.

use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::{Rng, RngCore};

/// Length of a generated id.
pub const ID_LENGTH: usize = 16;

/// Alphabet ids are drawn from.
pub const ID_ALPHABET: &[u8; 62] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Draw `length` characters uniformly from [`ID_ALPHABET`].
pub fn generate_id<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Source of fresh secret ids.
pub trait IdSource: Send + Sync + 'static {
    fn next_id(&self) -> String;
}

/// Ids from the operating system's CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRngIds;

impl IdSource for OsRngIds {
    fn next_id(&self) -> String {
        generate_id(&mut OsRng, ID_LENGTH)
    }
}

/// Ids from a caller-supplied generator, e.g. a seeded one in tests.
pub struct RngIds<R> {
    rng: Mutex<R>,
}

impl<R: RngCore + Send + 'static> RngIds<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl<R: RngCore + Send + 'static> IdSource for RngIds<R> {
    fn next_id(&self) -> String {
        generate_id(&mut *self.rng.lock(), ID_LENGTH)
    }
}
