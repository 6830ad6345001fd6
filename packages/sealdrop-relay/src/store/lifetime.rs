//! How long a secret lives and why it stops living.
//!
//! A stored secret ends in exactly one of two ways: its TTL elapses, or a
//! read-once secret is fetched. Both end in the same retirement path in
//! [`SecretStore`](super::SecretStore); this module only computes the TTL
//! and names the trigger.

use sealdrop_core::expiry::{ExpiryOption, DEFAULT_EXPIRY_SECS};

use super::kv::MIN_TTL_SECS;

/// Retention for read-once secrets, regardless of the requested option.
pub const READ_ONCE_TTL_SECS: u64 = 24 * 60 * 60;

/// Storage lifetime chosen for a new secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifetime {
    ttl_secs: u64,
    read_once: bool,
}

impl Lifetime {
    /// Read-once secrets keep one day. Others follow the option table,
    /// defaulting to one day for absent or unknown options. Never below
    /// [`MIN_TTL_SECS`].
    pub fn for_request(read_once: bool, option: Option<&ExpiryOption>) -> Self {
        let requested = if read_once {
            READ_ONCE_TTL_SECS
        } else {
            option.map_or(DEFAULT_EXPIRY_SECS, ExpiryOption::duration_secs)
        };

        Self {
            ttl_secs: clamp_ttl(requested),
            read_once,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Whether the first successful fetch retires the secret.
    pub fn burns_on_read(&self) -> bool {
        self.read_once
    }
}

/// Raise `secs` to the backend minimum.
pub fn clamp_ttl(secs: u64) -> u64 {
    secs.max(MIN_TTL_SECS)
}

/// Why a secret was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retirement {
    /// TTL elapsed.
    Elapsed,
    /// Read-once secret was fetched.
    Consumed,
}

impl Retirement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Retirement::Elapsed => "elapsed",
            Retirement::Consumed => "consumed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_table() {
        let cases = [
            ("5min", 300),
            ("30min", 1800),
            ("1hour", 3600),
            ("6hour", 21_600),
            ("1day", 86_400),
        ];
        for (name, secs) in cases {
            let option = ExpiryOption::parse(name);
            assert_eq!(Lifetime::for_request(false, Some(&option)).ttl_secs(), secs);
        }
    }

    #[test]
    fn test_absent_or_unknown_defaults_to_one_day() {
        assert_eq!(Lifetime::for_request(false, None).ttl_secs(), 86_400);
        let unknown = ExpiryOption::parse("2weeks");
        assert_eq!(Lifetime::for_request(false, Some(&unknown)).ttl_secs(), 86_400);
    }

    #[test]
    fn test_read_once_ignores_option() {
        let option = ExpiryOption::FiveMinutes;
        let lifetime = Lifetime::for_request(true, Some(&option));
        assert_eq!(lifetime.ttl_secs(), READ_ONCE_TTL_SECS);
        assert!(lifetime.burns_on_read());
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp_ttl(0), MIN_TTL_SECS);
        assert_eq!(clamp_ttl(59), MIN_TTL_SECS);
        assert_eq!(clamp_ttl(60), 60);
        assert_eq!(clamp_ttl(301), 301);
    }
}
