//! Time-scale helpers for birth-chart computation.
//!
//! This crate provides:
//! - Julian Date conversions for UTC instants
//! - IERS DUT1 lookup (UT1 − UTC) from finals2000A files
//! - Earth Rotation Angle, GMST and local sidereal time
//! - Parsing of naive civil timestamps and UTC instants

pub mod civil;
pub mod eop;
pub mod error;
pub mod julian;
pub mod sidereal;

pub use civil::{parse_local_datetime, parse_utc_instant};
pub use eop::{EopData, EopKernel};
pub use error::TimeError;
pub use julian::{
    J2000_JD, JD_UNIX_EPOCH, MJD_OFFSET, SECONDS_PER_DAY, datetime_to_jd, jd_to_centuries,
    jd_to_datetime,
};
pub use sidereal::{
    earth_rotation_angle_rad, gmst_deg, gmst_rad, local_sidereal_time_deg,
    local_sidereal_time_rad,
};

use chrono::{DateTime, Utc};

/// Where the UT1 used for sidereal time came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ut1Source {
    /// Interpolated from a loaded IERS table.
    Eop,
    /// UT1 approximated by UTC (|DUT1| < 0.9 s).
    UtcApprox,
}

/// UT1 Julian Date for a UTC instant.
///
/// Uses the EOP table when one is supplied and covers the epoch; otherwise
/// falls back to UT1 = UTC.
pub fn ut1_jd(utc: DateTime<Utc>, eop: Option<&EopKernel>) -> (f64, Ut1Source) {
    let jd_utc = datetime_to_jd(utc);
    match eop.map(|k| k.utc_to_ut1_jd(jd_utc)) {
        Some(Ok(jd_ut1)) => (jd_ut1, Ut1Source::Eop),
        _ => (jd_utc, Ut1Source::UtcApprox),
    }
}
