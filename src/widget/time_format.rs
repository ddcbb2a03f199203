//! Relative age labels for notification timestamps

use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;

/// Label the age of `timestamp` as seen from `now`.
///
/// Under a minute (or in the future) is "just now"; then minutes, hours and
/// days up to a week; anything older is a calendar date in `now`'s zone.
/// A missing timestamp yields an empty label.
pub fn format_relative<Tz>(now: &DateTime<Tz>, timestamp: Option<DateTime<Utc>>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(timestamp) = timestamp else {
        return String::new();
    };

    let age = now.with_timezone(&Utc).signed_duration_since(timestamp);

    if age.num_seconds() < 60 {
        return "just now".to_string();
    }

    let minutes = age.num_minutes();
    if minutes < 60 {
        return plural(minutes, "minute");
    }

    let hours = age.num_hours();
    if hours < 24 {
        return plural(hours, "hour");
    }

    let days = age.num_days();
    if days < 7 {
        return plural(days, "day");
    }

    timestamp
        .with_timezone(&now.timezone())
        .format("%b %-d, %Y")
        .to_string()
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}
