//! Normalizes the datetime spellings used by the providers onto one absolute
//! millisecond scale.
//!
//! Accepted inputs:
//!
//! | Input | Interpretation |
//! |-------|----------------|
//! | `2025-07-06T11:30:00Z`, `2025-07-06T11:30:00+02:00` | absolute (RFC 3339 / ISO 8601) |
//! | `2025-07-06 10:00:00`, `2025-07-06T10:00`, … | local wall-clock time |
//! | `2025-07-06` | local midnight |
//! | `1751796000` | seconds since the Unix epoch |

use time::format_description::well_known::{Iso8601, Rfc3339};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// Returned by [`normalize_timestamp`] for input that cannot be parsed.
/// Points carrying it must be dropped.
pub const INVALID_TIMESTAMP: i64 = 0;

const NAIVE_FORMATS: [&[BorrowedFormatItem<'static>]; 4] = [
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
];

const DATE_ONLY: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parses `raw` into an absolute instant. Strings without an offset are read
/// as wall-clock time at `local_offset`.
pub fn parse_instant(raw: &str, local_offset: UtcOffset) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if looks_numeric(raw) {
        return parse_unix_seconds(raw);
    }

    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed);
    }
    if let Ok(parsed) = OffsetDateTime::parse(raw, &Iso8601::DEFAULT) {
        return Some(parsed);
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = PrimitiveDateTime::parse(raw, format) {
            return Some(parsed.assume_offset(local_offset));
        }
    }

    Date::parse(raw, DATE_ONLY)
        .ok()
        .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_offset(local_offset))
}

/// Milliseconds since the Unix epoch, or [`INVALID_TIMESTAMP`].
pub fn normalize_timestamp(raw: &str, local_offset: UtcOffset) -> i64 {
    parse_instant(raw, local_offset)
        .map(unix_millis)
        .unwrap_or(INVALID_TIMESTAMP)
}

pub fn unix_millis(instant: OffsetDateTime) -> i64 {
    let millis = instant.unix_timestamp_nanos() / 1_000_000;
    i64::try_from(millis).unwrap_or(INVALID_TIMESTAMP)
}

/// RFC 3339 key used when an adapter derives its own timestamps.
pub fn format_instant(instant: OffsetDateTime) -> Option<String> {
    instant.to_offset(UtcOffset::UTC).format(&Rfc3339).ok()
}

fn looks_numeric(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    !digits.is_empty()
        && digits.chars().all(|ch| ch.is_ascii_digit() || ch == '.')
        && digits.chars().filter(|ch| *ch == '.').count() <= 1
}

fn parse_unix_seconds(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(seconds) = raw.parse::<i64>() {
        return OffsetDateTime::from_unix_timestamp(seconds).ok();
    }

    let seconds = raw.parse::<f64>().ok().filter(|value| value.is_finite())?;
    let nanos = (seconds * 1_000_000_000.0).round() as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
}
