//! Turns a canonical result into the ordered series emitted for one target.

use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::domain::timestamp::{normalize_timestamp, INVALID_TIMESTAMP};
use crate::{CanonicalResult, ForecastPeriod, TimeSeriesPoint};

/// Local-day window `[00:00:00.000, 23:59:59.999]` for `today + offset_days`.
pub fn day_window(today: Date, offset_days: i64, local_offset: UtcOffset) -> (i64, i64) {
    let day = today.saturating_add(Duration::days(offset_days));
    let start = PrimitiveDateTime::new(day, Time::MIDNIGHT).assume_offset(local_offset);
    let start_ms = start.unix_timestamp() * 1_000;
    (start_ms, start_ms + 86_400_000 - 1)
}

/// Selects `metric_key`, applies the period filter, drops unparseable
/// timestamps and sorts ascending by time.
///
/// A metric absent from `result` yields an empty series.
pub fn assemble(
    result: &CanonicalResult,
    metric_key: &str,
    period: ForecastPeriod,
    today: Date,
    local_offset: UtcOffset,
) -> Vec<TimeSeriesPoint> {
    let Some(series) = result.series(metric_key) else {
        return Vec::new();
    };

    let window = period
        .offset_days()
        .map(|offset| day_window(today, offset, local_offset));

    let mut dropped = 0_usize;
    let mut points: Vec<(i64, f64)> = series
        .iter()
        .filter_map(|(raw, value)| {
            let millis = normalize_timestamp(raw, local_offset);
            if millis == INVALID_TIMESTAMP {
                dropped += 1;
                return None;
            }
            Some((millis, *value))
        })
        .filter(|(millis, _)| window.map_or(true, |(start, end)| (start..=end).contains(millis)))
        .collect();

    if dropped > 0 {
        tracing::warn!(metric = metric_key, dropped, "dropped points with unparseable timestamps");
    }

    points.sort_by_key(|(millis, _)| *millis);

    points
        .into_iter()
        .filter_map(|(millis, value)| {
            let time = OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
                .ok()?
                .checked_to_offset(local_offset)?;
            Some(TimeSeriesPoint::new(time, value))
        })
        .collect()
}
