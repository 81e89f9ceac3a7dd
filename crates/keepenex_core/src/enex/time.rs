//! ENEX timestamp formatting.

use chrono::{DateTime, Utc};

const ENEX_TIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Formats a UTC instant as `YYYYMMDDTHHMMSSZ`.
pub fn enex_datetime(instant: DateTime<Utc>) -> String {
    instant.format(ENEX_TIME_FORMAT).to_string()
}

/// Formats microseconds since the Unix epoch; out-of-range values map to
/// epoch zero.
pub fn enex_datetime_from_usec(usec: i64) -> String {
    enex_datetime(DateTime::from_timestamp_micros(usec).unwrap_or_default())
}

/// Epoch-zero timestamp used for `created`, which Keep does not record.
pub fn enex_epoch() -> String {
    enex_datetime(DateTime::<Utc>::default())
}
