use chrono::{DateTime, TimeZone};

/// This is the standard way of stamping a git snapshot in worklog.
pub fn snapshot_timestamp<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%d %H:%M:%S %Z").to_string()
}
