use chrono::{DateTime, Local};

use crate::constants::{DEFAULT_TIMESTAMP_FORMAT, SECONDS_PER_DAY};

/// Format a unix timestamp (seconds, fractional allowed) in local time.
///
/// `fmt` is a strftime pattern and defaults to `%Y-%m-%d %H:%M:%S`. Returns
/// `None` when the timestamp is outside the representable range.
pub fn format_timestamp(timestamp: f64, fmt: Option<&str>) -> Option<String> {
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9).round() as u32;
    let dt = DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))?;

    Some(
        dt.with_timezone(&Local)
            .format(fmt.unwrap_or(DEFAULT_TIMESTAMP_FORMAT))
            .to_string(),
    )
}

/// Whether `old_timestamp` lies no more than `days` days before `new_timestamp`.
///
/// An old timestamp later than the new one counts as within the window.
pub fn is_within_days(days: u32, new_timestamp: f64, old_timestamp: f64) -> bool {
    new_timestamp - old_timestamp <= f64::from(days) * SECONDS_PER_DAY
}
