/*!
 Contains date utilities for the plist timestamp epoch.

 Plist dates count seconds from 2001-01-01T00:00:00Z, not the Unix epoch;
 these helpers convert between that representation and [`chrono`] types.
*/

use chrono::{DateTime, Utc};

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z
pub const APPLE_EPOCH_OFFSET: i64 = 978307200;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Convert a plist timestamp to a [`DateTime`]
///
/// Returns `None` when the seconds value falls outside the representable
/// date range.
pub fn from_apple_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let unix = seconds + APPLE_EPOCH_OFFSET as f64;
    let whole = unix.floor();
    let nanos = ((unix - whole) * NANOS_PER_SECOND).round() as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

/// Convert a [`DateTime`] to a plist timestamp
pub fn to_apple_seconds(date: &DateTime<Utc>) -> f64 {
    let unix = date.timestamp() as f64
        + date.timestamp_subsec_nanos() as f64 / NANOS_PER_SECOND;
    unix - APPLE_EPOCH_OFFSET as f64
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use crate::util::dates::{from_apple_seconds, to_apple_seconds};

    #[test]
    fn test_epoch_zero_is_2001() {
        let date = from_apple_seconds(0.0).unwrap();
        assert_eq!(date.to_rfc3339(), "2001-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_known_timestamp() {
        let date = from_apple_seconds(331812000.0).unwrap();
        assert_eq!(date.to_rfc3339(), "2011-07-08T10:00:00+00:00");
    }

    #[test]
    fn test_negative_seconds_before_epoch() {
        let date = from_apple_seconds(-86400.0).unwrap();
        assert_eq!(date.to_rfc3339(), "2000-12-31T00:00:00+00:00");
    }

    #[test]
    fn test_round_trips_through_chrono() {
        let seconds = 123456789.5;
        let date = from_apple_seconds(seconds).unwrap();
        assert!((to_apple_seconds(&date) - seconds).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(from_apple_seconds(f64::NAN).is_none());
        assert!(from_apple_seconds(f64::INFINITY).is_none());
    }

    #[test]
    fn test_unix_epoch_is_negative_offset() {
        let unix_epoch = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        assert_eq!(to_apple_seconds(&unix_epoch), -978307200.0);
    }
}
