//! Timestamp helpers
//!
//! Records carry naive local timestamps. Inputs are ISO-8601 date-times,
//! either local or carrying `Z`/an offset (converted to local time); outputs
//! are ISO-8601 strings.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SubsecRound};

const INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Current local time, truncated to microseconds
pub fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(6)
}

/// Zoned forms; `%#z` also takes `Z` and `+02`
const ZONED_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M%#z"];

/// Parse an ISO-8601 date-time, or a bare date meaning midnight.
///
/// A `Z` suffix or numeric offset is honored and the instant converted to
/// local time.
pub fn parse(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| parse_zoned(value))
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_zoned(value: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .or_else(|| {
            ZONED_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
        })
        .map(|dt| dt.with_timezone(&Local).naive_local())
}

/// ISO-8601 form used in JSON records
pub fn to_iso(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}
