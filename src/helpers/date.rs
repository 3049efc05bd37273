//! Date helper functions

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Format a publication timestamp for display
///
/// Uses the configured timezone when there is one, UTC otherwise.
///
/// # Examples
/// ```ignore
/// format_published(&date, None, "%-m/%-d/%Y, %-I:%M:%S %p") // -> "1/15/2024, 3:04:05 PM"
/// ```
pub fn format_published(date: &DateTime<Utc>, tz: Option<Tz>, format: &str) -> String {
    match tz {
        Some(tz) => date.with_timezone(&tz).format(format).to_string(),
        None => date.format(format).to_string(),
    }
}

/// Format a date in ISO 8601 format, for `<time datetime>`
pub fn date_xml(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
