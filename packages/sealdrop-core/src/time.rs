//! Clock helpers shared by the codec, relay, and CLI.
//!
//! Sealed expiries and record creation times are Unix milliseconds, the same
//! unit a browser sender gets from `Date.now()`. On `wasm32-unknown-unknown`
//! `std::time::SystemTime` is unavailable, so the browser clock is used there.

/// Returns the current Unix timestamp in milliseconds.
pub fn now_millis() -> i64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as i64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Unix milliseconds `secs` seconds from now, saturating on overflow.
pub fn millis_from_now(secs: u64) -> i64 {
    let offset = i64::try_from(secs.saturating_mul(1000)).unwrap_or(i64::MAX);
    now_millis().saturating_add(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_millis_is_reasonable() {
        let ts = now_millis();
        // After 2024-01-01, before 2100-01-01
        assert!(ts > 1_704_067_200_000, "Timestamp {} is too old", ts);
        assert!(ts < 4_102_444_800_000, "Timestamp {} is too far in future", ts);
    }

    #[test]
    fn test_millis_from_now_offsets_forward() {
        let before = now_millis();
        let later = millis_from_now(300);
        assert!(later >= before + 300_000);
    }

    #[test]
    fn test_millis_from_now_saturates() {
        assert_eq!(millis_from_now(u64::MAX), i64::MAX);
    }
}
