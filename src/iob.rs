//! Insulin-on-board estimation
//!
//! Projects active insulin hour by hour for a single day. Each dosing event
//! decays linearly to zero over the configured action duration; the hourly
//! value is the decay-weighted sum over the trailing window at the top of the
//! hour. Events from the prior day still contribute while inside the window,
//! so the estimator looks back across the day boundary.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::AnalyticsError;
use crate::types::{HourlyIobData, InsulinKind, InsulinReading};

/// Default insulin action duration in hours
pub const DEFAULT_ACTION_HOURS: u32 = 5;

/// Lowest accepted action duration
pub const MIN_ACTION_HOURS: u32 = 1;
/// Highest accepted action duration
pub const MAX_ACTION_HOURS: u32 = 10;

/// Fraction of a dose still active `age_hours` after delivery, under linear
/// decay over `duration_hours`. Zero for negative ages (future events) and
/// for ages at or past the duration.
pub fn remaining_fraction(age_hours: f64, duration_hours: f64) -> f64 {
    if age_hours < 0.0 || duration_hours <= 0.0 {
        return 0.0;
    }
    (1.0 - age_hours / duration_hours).max(0.0)
}

/// Compute the 24-entry hourly IOB series for `date`.
///
/// `active_iob` is evaluated at the top of each hour; the per-hour basal and
/// bolus totals are raw unit sums over the preceding hour (no decay), which
/// for hour 0 reaches into the prior day.
pub fn prepare_hourly_iob(
    events: &[InsulinReading],
    date: NaiveDate,
    action_duration_hours: u32,
) -> Result<Vec<HourlyIobData>, AnalyticsError> {
    if !(MIN_ACTION_HOURS..=MAX_ACTION_HOURS).contains(&action_duration_hours) {
        return Err(AnalyticsError::InvalidDuration(action_duration_hours));
    }
    let duration = action_duration_hours as f64;
    let midnight = date.and_time(NaiveTime::MIN);

    let mut series = Vec::with_capacity(24);
    for hour in 0..24u32 {
        let hour_start = midnight + Duration::hours(hour as i64);
        let prev_hour_start = hour_start - Duration::hours(1);

        let mut active_iob = 0.0;
        let mut basal_in_previous_hour = 0.0;
        let mut bolus_in_previous_hour = 0.0;

        for event in events {
            let age_hours = hours_between(event.timestamp, hour_start);
            active_iob += event.units * remaining_fraction(age_hours, duration);

            if event.timestamp >= prev_hour_start && event.timestamp < hour_start {
                match event.kind {
                    InsulinKind::Basal => basal_in_previous_hour += event.units,
                    InsulinKind::Bolus => bolus_in_previous_hour += event.units,
                }
            }
        }

        series.push(HourlyIobData {
            hour,
            time_label: format!("{hour:02}:00"),
            active_iob,
            basal_in_previous_hour,
            bolus_in_previous_hour,
        });
    }

    Ok(series)
}

/// [`prepare_hourly_iob`] taking the date as a `YYYY-MM-DD` string
pub fn prepare_hourly_iob_for_date(
    events: &[InsulinReading],
    date: &str,
    action_duration_hours: u32,
) -> Result<Vec<HourlyIobData>, AnalyticsError> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| AnalyticsError::DateParseError(format!("{date}: {e}")))?;
    prepare_hourly_iob(events, parsed, action_duration_hours)
}

fn hours_between(earlier: NaiveDateTime, later: NaiveDateTime) -> f64 {
    (later - earlier).num_seconds() as f64 / 3600.0
}
