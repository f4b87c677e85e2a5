//! Core Data timestamp normalization.
//!
//! The Notes store records dates as whole seconds since
//! 2001-01-01T00:00:00Z (the Core Data reference date). A missing or zero
//! value means "unknown" and is mapped to the Unix epoch.

use chrono::{DateTime, Utc};

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z.
pub const CORE_DATA_EPOCH_OFFSET: i64 = 978_307_200;

/// Convert a Core Data timestamp to a UTC instant.
///
/// `None`, `Some(0)` and values outside chrono's representable range all
/// return [`DateTime::UNIX_EPOCH`].
pub fn from_core_data(seconds: Option<i64>) -> DateTime<Utc> {
    match seconds {
        None | Some(0) => DateTime::UNIX_EPOCH,
        Some(secs) => secs
            .checked_add(CORE_DATA_EPOCH_OFFSET)
            .and_then(|unix| DateTime::from_timestamp(unix, 0))
            .unwrap_or(DateTime::UNIX_EPOCH),
    }
}

/// Format a Core Data timestamp as RFC 3339, the shape stored in the index.
pub fn to_rfc3339(seconds: Option<i64>) -> String {
    from_core_data(seconds).to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_unknown_maps_to_unix_epoch() {
        assert_eq!(from_core_data(None), DateTime::UNIX_EPOCH);
        assert_eq!(from_core_data(Some(0)), DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_reference_date() {
        let expected = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 1).unwrap();
        assert_eq!(from_core_data(Some(1)), expected);
    }

    #[test]
    fn test_positive_offset() {
        // 694_224_000 s = 8035 days after 2001-01-01
        let expected = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(from_core_data(Some(694_224_000)), expected);
    }

    #[test]
    fn test_negative_offset_before_reference() {
        let expected = Utc.with_ymd_and_hms(2000, 12, 31, 23, 59, 0).unwrap();
        assert_eq!(from_core_data(Some(-60)), expected);
    }

    #[test]
    fn test_overflow_is_unknown() {
        assert_eq!(from_core_data(Some(i64::MAX)), DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_rfc3339() {
        assert_eq!(to_rfc3339(None), "1970-01-01T00:00:00+00:00");
    }
}
