use chrono::Utc;

/// Get current Unix timestamp in nanoseconds.
///
/// Falls back to microsecond precision scaled up if the nanosecond value does
/// not fit in an `i64` (after the year 2262).
pub fn unix_nanos() -> i64 {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1_000))
}
