//! File age derivation from filesystem timestamps.

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDateTime, NaiveTime};
use std::fs::Metadata;
use std::time::SystemTime;

/// The start of the current day in local time, the reference point for all
/// age calculations within one run.
pub fn start_of_today() -> NaiveDateTime {
    Local::now().date_naive().and_time(NaiveTime::MIN)
}

/// Age of a timestamp in whole days relative to `today` (local start of day).
///
/// Fractional days truncate toward zero, so a file modified at noon ten and a
/// half days ago is 10 days old. Timestamps later than `today` yield zero or
/// negative ages.
pub fn age_in_days(timestamp: SystemTime, today: NaiveDateTime) -> i64 {
    let local: DateTime<Local> = timestamp.into();
    (today - local.naive_local()).num_days()
}

/// Age of a file in whole days, taking whichever of the modified and created
/// timestamps is more recent.
///
/// A file whose content is old but was recently copied (fresh creation time),
/// or vice versa, gets the smaller of the two ages, erring toward keeping it.
/// Filesystems without creation times fall back to the modified time alone.
pub fn file_age_days(meta: &Metadata, today: NaiveDateTime) -> Result<i64> {
    let modified = meta.modified()?;
    let created = meta.created().unwrap_or(modified);

    Ok(age_in_days(modified, today).min(age_in_days(created, today)))
}
