//! Julian Date conversions for UTC instants.
//!
//! Julian Dates here are continuous day counts of the UTC (or UT1) scale.
//! Leap seconds are ignored: the chart pipeline only needs sidereal time and
//! precession, both of which tolerate the < 1 s ambiguity.

use chrono::{DateTime, TimeZone, Utc};

/// Julian Date of the J2000.0 epoch (2000-01-01T12:00:00).
pub const J2000_JD: f64 = 2_451_545.0;

/// Julian Date of 1970-01-01T00:00:00.
pub const JD_UNIX_EPOCH: f64 = 2_440_587.5;

/// JD − MJD.
pub const MJD_OFFSET: f64 = 2_400_000.5;

/// Seconds per day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Julian Date of a UTC instant (millisecond resolution).
pub fn datetime_to_jd(t: DateTime<Utc>) -> f64 {
    JD_UNIX_EPOCH + t.timestamp_millis() as f64 / (SECONDS_PER_DAY * 1000.0)
}

/// UTC instant for a Julian Date, rounded to the nearest millisecond.
///
/// Returns `None` outside chrono's representable range.
pub fn jd_to_datetime(jd: f64) -> Option<DateTime<Utc>> {
    let ms = ((jd - JD_UNIX_EPOCH) * SECONDS_PER_DAY * 1000.0).round();
    if !ms.is_finite() || ms.abs() > i64::MAX as f64 {
        return None;
    }
    Utc.timestamp_millis_opt(ms as i64).single()
}

/// Julian centuries since J2000.0.
pub fn jd_to_centuries(jd: f64) -> f64 {
    (jd - J2000_JD) / 36525.0
}
