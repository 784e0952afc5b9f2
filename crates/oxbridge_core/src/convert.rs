//! Scalar conversions across the boundary.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Encodes a boolean as the native `i8` flag.
pub fn bool_to_native(value: bool) -> i8 {
    i8::from(value)
}

/// Decodes a native flag. Any non-zero value is true.
pub fn native_to_bool<T>(value: T) -> bool
where
    T: Into<i32>,
{
    value.into() != 0
}

/// Decodes an optional native flag.
pub fn nullable_bool(value: Option<i8>) -> Option<bool> {
    value.map(native_to_bool)
}

/// Converts native milliseconds since the Unix epoch.
pub fn timestamp_to_system_time(millis: i64) -> SystemTime {
    let offset = Duration::from_millis(millis.unsigned_abs());
    if millis >= 0 {
        UNIX_EPOCH + offset
    } else {
        UNIX_EPOCH - offset
    }
}

/// Encodes a duration as native milliseconds, saturating at `u64::MAX`.
pub fn duration_to_native(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Decodes native milliseconds.
pub const fn native_to_duration(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_to_int() {
        assert_eq!(bool_to_native(true), 1);
        assert_eq!(bool_to_native(false), 0);
    }

    #[test]
    fn int_to_bool() {
        for v in [1i8, -1, 32, -32, 127, -127] {
            assert!(native_to_bool(v), "{v} should be true");
        }
        assert!(!native_to_bool(0i8));

        assert!(native_to_bool(1u8));
        assert!(native_to_bool(32u8));
        assert!(native_to_bool(255u8));
        assert!(!native_to_bool(0u8));
    }

    #[test]
    fn nullable() {
        assert_eq!(nullable_bool(None), None);
        assert_eq!(nullable_bool(Some(0)), Some(false));
        assert_eq!(nullable_bool(Some(-3)), Some(true));
    }

    #[test]
    fn timestamp_millis() {
        let time = timestamp_to_system_time(1_587_745_315_000);
        let since = time.duration_since(UNIX_EPOCH).unwrap();
        // 2020-04-24T16:21:55Z
        assert_eq!(since.as_secs(), 1_587_745_315);
    }

    #[test]
    fn timestamp_before_epoch() {
        let time = timestamp_to_system_time(-1500);
        let before = UNIX_EPOCH.duration_since(time).unwrap();
        assert_eq!(before, Duration::from_millis(1500));
    }

    #[test]
    fn duration_round_trip() {
        let d = Duration::from_secs(30);
        assert_eq!(duration_to_native(d), 30_000);
        assert_eq!(native_to_duration(30_000), d);
    }

    #[test]
    fn duration_saturates() {
        assert_eq!(duration_to_native(Duration::MAX), u64::MAX);
    }

    #[test]
    fn sub_millisecond_truncates() {
        assert_eq!(duration_to_native(Duration::from_micros(1999)), 1);
    }
}
