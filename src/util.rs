// src/util.rs

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Timelike, Utc};
use std::path::Path;

const MICROS_PER_SECOND: i128 = 1_000_000;
const MICROS_PER_DAY: i128 = 86_400 * MICROS_PER_SECOND;

/// Read a UTF-8 file into a String with a clear error message.
///
/// This is mainly used for:
/// - saved stack event JSON
pub fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
}

/// Ensure a directory exists (create it if missing).
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory {:?}", path))
}

/// Render a duration as `[D day[s], ]H:MM:SS[.ffffff]`.
///
/// Negative values carry the sign on the day count only, so one second
/// before zero reads `-1 day, 23:59:59`.
///
/// Example:
/// 3 minutes 30 seconds → `0:03:30`
/// 26 hours 250 ms      → `1 day, 2:00:00.250000`
pub fn format_duration(delta: TimeDelta) -> String {
    let total = i128::from(delta.num_seconds()) * MICROS_PER_SECOND
        + i128::from(delta.subsec_nanos() / 1_000);

    let days = total.div_euclid(MICROS_PER_DAY);
    let rest = total.rem_euclid(MICROS_PER_DAY);

    let seconds = rest / MICROS_PER_SECOND;
    let micros = rest % MICROS_PER_SECOND;

    let mut out = String::new();
    if days != 0 {
        let plural = if days.abs() != 1 { "s" } else { "" };
        out.push_str(&format!("{} day{}, ", days, plural));
    }

    out.push_str(&format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    ));

    if micros != 0 {
        out.push_str(&format!(".{:06}", micros));
    }

    out
}

/// Render a UTC instant as `YYYY-MM-DD HH:MM:SS[.ffffff]+00:00`.
///
/// Sub-second digits appear only when the instant has a microsecond part.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    let micros = ts.nanosecond() % 1_000_000_000 / 1_000;

    let mut out = ts.format("%Y-%m-%d %H:%M:%S").to_string();
    if micros != 0 {
        out.push_str(&format!(".{:06}", micros));
    }
    out.push_str("+00:00");
    out
}

/// Display helper for optional values: the value, or `None`.
pub fn or_none<T>(value: Option<T>, render: impl FnOnce(T) -> String) -> String {
    value.map(render).unwrap_or_else(|| "None".to_string())
}

/// Duration as fractional seconds, for machine-readable output.
pub fn duration_seconds(delta: TimeDelta) -> f64 {
    delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) / 1e9
}
