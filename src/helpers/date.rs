//! Date helper functions

use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Tz;

/// Start of a publish date in the site timezone
pub fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Tz> {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    // DST gaps at midnight resolve to the earliest valid instant
    tz.from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Z: TimeZone>(date: &DateTime<Z>) -> String
where
    Z::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Format date in full format (like "March 08, 2016")
pub fn full_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}
