//! # Envelope Codec
//!
//! Password-sealed, encrypt-then-MAC envelopes.
//!
//! ## Wire Format
//!
//! ```text
//! base64(salt) . base64(iv) . base64(ciphertext) . base64(mac)
//!    16 bytes     16 bytes     n × 16 bytes         32 bytes
//! ```
//!
//! Standard base64 alphabet with padding; `.` never appears inside a field.
//!
//! ## Seal / Open
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  encrypt(message, password, expiry)                                     │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  1. salt ← 16 random bytes                                              │
//! │  2. (enc_key, mac_key) ← PBKDF2-SHA256(password, salt, 100k) split     │
//! │  3. record ← {"message": …, "expiry": …}                               │
//! │  4. iv ← 16 random bytes                                                │
//! │  5. ciphertext ← AES-256-CBC-PKCS7(enc_key, iv, record)                │
//! │  6. mac ← HMAC-SHA256(mac_key, iv ‖ ciphertext)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  decrypt(envelope, password)                                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  1. parse four fields            ── MalformedEnvelope                   │
//! │  2. re-derive keys from salt                                            │
//! │  3. verify mac (constant time)   ── AuthenticationFailed  ◄── gate      │
//! │  4. AES-256-CBC decrypt          ── InvalidPadding                      │
//! │  5. parse record                 ── MalformedPayload                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing touches the cipher until step 3 succeeds, so a forged ciphertext
//! can never reach the padding check.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::kdf::{derive_keys, DerivedKeys, SALT_SIZE};
use crate::error::{Error, Result};
use crate::payload::PlaintextRecord;

/// Initialization vector length in bytes
pub const IV_SIZE: usize = 16;

/// HMAC-SHA256 tag length in bytes
pub const MAC_SIZE: usize = 32;

/// AES block length in bytes
pub const BLOCK_SIZE: usize = 16;

/// Separator between the four envelope fields
pub const DELIMITER: char = '.';

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// A parsed envelope
///
/// Construction through [`Envelope::parse`] guarantees the field-length
/// invariants; it does not authenticate anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    salt: [u8; SALT_SIZE],
    iv: [u8; IV_SIZE],
    ciphertext: Vec<u8>,
    mac: [u8; MAC_SIZE],
}

impl Envelope {
    /// Parse the four-part envelope string
    pub fn parse(input: &str) -> Result<Self> {
        let fields: Vec<&str> = input.split(DELIMITER).collect();
        if fields.len() != 4 {
            return Err(Error::MalformedEnvelope(format!(
                "expected 4 fields, found {}",
                fields.len()
            )));
        }

        let salt = decode_fixed::<SALT_SIZE>("salt", fields[0])?;
        let iv = decode_fixed::<IV_SIZE>("iv", fields[1])?;
        let ciphertext = decode_field("ciphertext", fields[2])?;
        let mac = decode_fixed::<MAC_SIZE>("mac", fields[3])?;

        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(Error::MalformedEnvelope(format!(
                "ciphertext length {} is not a positive multiple of {}",
                ciphertext.len(),
                BLOCK_SIZE
            )));
        }

        Ok(Self {
            salt,
            iv,
            ciphertext,
            mac,
        })
    }

    /// KDF salt
    pub fn salt(&self) -> &[u8; SALT_SIZE] {
        &self.salt
    }

    /// CBC initialization vector
    pub fn iv(&self) -> &[u8; IV_SIZE] {
        &self.iv
    }

    /// Padded AES-256-CBC ciphertext
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// HMAC-SHA256 over `iv ‖ ciphertext`
    pub fn mac(&self) -> &[u8; MAC_SIZE] {
        &self.mac
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{d}{}{d}{}{d}{}",
            STANDARD.encode(self.salt),
            STANDARD.encode(self.iv),
            STANDARD.encode(&self.ciphertext),
            STANDARD.encode(self.mac),
            d = DELIMITER
        )
    }
}

impl FromStr for Envelope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Envelope::parse(s)
    }
}

/// Encrypt `message` (and its optional expiry, Unix millis) under `password`
///
/// Returns the serialized `salt.iv.ciphertext.mac` string.
pub fn encrypt(message: &str, password: &str, expiry: Option<i64>) -> Result<String> {
    let record = PlaintextRecord::new(message, expiry);
    Ok(seal_record(&record, password)?.to_string())
}

/// Seal a record with fresh random salt and iv
pub fn seal_record(record: &PlaintextRecord, password: &str) -> Result<Envelope> {
    let mut salt = [0u8; SALT_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    let mut iv = [0u8; IV_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut iv);

    let keys = derive_keys(password.as_bytes(), &salt);
    let plaintext = Zeroizing::new(record.to_canonical_bytes()?);
    seal_bytes(&keys, salt, iv, &plaintext)
}

/// Decrypt and verify an envelope string
///
/// The returned record's expiry is not checked; see
/// [`PlaintextRecord::is_expired_at`].
pub fn decrypt(envelope: &str, password: &str) -> Result<PlaintextRecord> {
    let envelope = Envelope::parse(envelope)?;
    open_envelope(&envelope, password)
}

/// Verify and decrypt an already-parsed envelope
pub fn open_envelope(envelope: &Envelope, password: &str) -> Result<PlaintextRecord> {
    let keys = derive_keys(password.as_bytes(), envelope.salt());
    open_with_keys(envelope, &keys)
}

/// Encrypt-then-MAC `plaintext` with explicit keys, salt and iv
fn seal_bytes(
    keys: &DerivedKeys,
    salt: [u8; SALT_SIZE],
    iv: [u8; IV_SIZE],
    plaintext: &[u8],
) -> Result<Envelope> {
    let ciphertext = Aes256CbcEnc::new_from_slices(keys.encryption_key(), &iv)
        .map_err(|e| Error::EncryptionFailed(format!("Invalid key or iv: {}", e)))?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let tag: [u8; MAC_SIZE] = mac_over(keys, &iv, &ciphertext)
        .map_err(|e| Error::EncryptionFailed(format!("Invalid MAC key: {}", e)))?
        .finalize()
        .into_bytes()
        .into();

    Ok(Envelope {
        salt,
        iv,
        ciphertext,
        mac: tag,
    })
}

/// MAC gate, then decrypt, then parse
fn open_with_keys(envelope: &Envelope, keys: &DerivedKeys) -> Result<PlaintextRecord> {
    mac_over(keys, envelope.iv(), envelope.ciphertext())
        .map_err(|_| Error::AuthenticationFailed)?
        .verify_slice(envelope.mac())
        .map_err(|_| {
            tracing::debug!("Envelope MAC mismatch");
            Error::AuthenticationFailed
        })?;

    let plaintext = Zeroizing::new(
        Aes256CbcDec::new_from_slices(keys.encryption_key(), envelope.iv())
            .map_err(|_| Error::AuthenticationFailed)?
            .decrypt_padded_vec_mut::<Pkcs7>(envelope.ciphertext())
            .map_err(|_| Error::InvalidPadding)?,
    );

    PlaintextRecord::from_canonical_bytes(&plaintext)
}

fn mac_over(
    keys: &DerivedKeys,
    iv: &[u8],
    ciphertext: &[u8],
) -> std::result::Result<HmacSha256, hmac::digest::InvalidLength> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(keys.mac_key())?;
    mac.update(iv);
    mac.update(ciphertext);
    Ok(mac)
}

fn decode_field(name: &str, field: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(field)
        .map_err(|e| Error::MalformedEnvelope(format!("{} is not valid base64: {}", name, e)))
}

fn decode_fixed<const N: usize>(name: &str, field: &str) -> Result<[u8; N]> {
    let bytes = decode_field(name, field)?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        Error::MalformedEnvelope(format!("{} must be {} bytes, got {}", name, N, bytes.len()))
    })
}

// ============================================================================
// TESTS
// ============================================================================
