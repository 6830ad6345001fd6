//! User-facing expiry choices.
//!
//! The same option string drives two independent clocks: the sender seals
//! `now + duration` into the plaintext record, and the relay maps it to a
//! storage TTL. Unknown strings are kept verbatim so the relay can echo them
//! back in metadata, but they fall back to the default duration.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default duration for missing or unrecognized options (1 day).
pub const DEFAULT_EXPIRY_SECS: u64 = 24 * 60 * 60;

/// Expiry option as submitted by a client
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExpiryOption {
    /// `5min`
    FiveMinutes,
    /// `30min`
    ThirtyMinutes,
    /// `1hour`
    OneHour,
    /// `6hour`
    SixHours,
    /// `1day`
    OneDay,
    /// Anything else, preserved as sent
    Unrecognized(String),
}

impl ExpiryOption {
    /// Every recognized option, shortest first
    pub const KNOWN: [ExpiryOption; 5] = [
        ExpiryOption::FiveMinutes,
        ExpiryOption::ThirtyMinutes,
        ExpiryOption::OneHour,
        ExpiryOption::SixHours,
        ExpiryOption::OneDay,
    ];

    /// Parse an option string; never fails
    pub fn parse(value: &str) -> Self {
        match value {
            "5min" => ExpiryOption::FiveMinutes,
            "30min" => ExpiryOption::ThirtyMinutes,
            "1hour" => ExpiryOption::OneHour,
            "6hour" => ExpiryOption::SixHours,
            "1day" => ExpiryOption::OneDay,
            other => ExpiryOption::Unrecognized(other.to_string()),
        }
    }

    /// Wire string for this option
    pub fn as_str(&self) -> &str {
        match self {
            ExpiryOption::FiveMinutes => "5min",
            ExpiryOption::ThirtyMinutes => "30min",
            ExpiryOption::OneHour => "1hour",
            ExpiryOption::SixHours => "6hour",
            ExpiryOption::OneDay => "1day",
            ExpiryOption::Unrecognized(raw) => raw,
        }
    }

    /// Duration in seconds; unrecognized options get [`DEFAULT_EXPIRY_SECS`]
    pub fn duration_secs(&self) -> u64 {
        match self {
            ExpiryOption::FiveMinutes => 5 * 60,
            ExpiryOption::ThirtyMinutes => 30 * 60,
            ExpiryOption::OneHour => 60 * 60,
            ExpiryOption::SixHours => 6 * 60 * 60,
            ExpiryOption::OneDay => 24 * 60 * 60,
            ExpiryOption::Unrecognized(_) => DEFAULT_EXPIRY_SECS,
        }
    }

    /// Whether this is one of the five known options
    pub fn is_recognized(&self) -> bool {
        !matches!(self, ExpiryOption::Unrecognized(_))
    }
}

impl Default for ExpiryOption {
    fn default() -> Self {
        ExpiryOption::OneDay
    }
}

impl From<String> for ExpiryOption {
    fn from(value: String) -> Self {
        ExpiryOption::parse(&value)
    }
}

impl From<ExpiryOption> for String {
    fn from(option: ExpiryOption) -> Self {
        match option {
            ExpiryOption::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for ExpiryOption {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ExpiryOption::parse(s))
    }
}

impl fmt::Display for ExpiryOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_options_round_trip_strings() {
        for option in ExpiryOption::KNOWN {
            assert_eq!(ExpiryOption::parse(option.as_str()), option);
            assert!(option.is_recognized());
        }
    }

    #[test]
    fn test_duration_table() {
        assert_eq!(ExpiryOption::FiveMinutes.duration_secs(), 300);
        assert_eq!(ExpiryOption::ThirtyMinutes.duration_secs(), 1_800);
        assert_eq!(ExpiryOption::OneHour.duration_secs(), 3_600);
        assert_eq!(ExpiryOption::SixHours.duration_secs(), 21_600);
        assert_eq!(ExpiryOption::OneDay.duration_secs(), 86_400);
    }

    #[test]
    fn test_unrecognized_defaults_to_one_day() {
        let option = ExpiryOption::parse("2weeks");
        assert_eq!(option, ExpiryOption::Unrecognized("2weeks".into()));
        assert_eq!(option.duration_secs(), DEFAULT_EXPIRY_SECS);
        assert_eq!(option.as_str(), "2weeks");
        assert!(!option.is_recognized());
    }

    #[test]
    fn test_serde_uses_plain_strings() {
        let json = serde_json::to_string(&ExpiryOption::SixHours).unwrap();
        assert_eq!(json, "\"6hour\"");

        let option: ExpiryOption = serde_json::from_str("\"forever\"").unwrap();
        assert_eq!(option, ExpiryOption::Unrecognized("forever".into()));
        assert_eq!(serde_json::to_string(&option).unwrap(), "\"forever\"");
    }
}
