//! Earth Rotation Angle, Greenwich Mean Sidereal Time and local sidereal time.
//!
//! All functions take UT1 Julian Dates (see [`crate::ut1_jd`]).
//!
//! Sources:
//! - ERA: IERS Conventions 2010, Eq. 5.15. Public domain.
//! - GMST polynomial: Capitaine et al. 2003, Table 2. Public domain.

use std::f64::consts::{PI, TAU};

use crate::julian::J2000_JD;

const ARCSEC_TO_RAD: f64 = PI / (180.0 * 3600.0);

/// Earth Rotation Angle at a UT1 Julian Date, radians in [0, 2π).
///
/// θ = 2π × (0.7790572732640 + 1.00273781191135448 × Du), Du = JD_UT1 − 2451545.0.
pub fn earth_rotation_angle_rad(jd_ut1: f64) -> f64 {
    let du = jd_ut1 - J2000_JD;
    // Split the day count so the fractional turn keeps full precision.
    let turns = 0.779_057_273_264_0 + 0.002_737_811_911_354_48 * du + du.fract();
    (TAU * turns.rem_euclid(1.0)).rem_euclid(TAU)
}

/// Greenwich Mean Sidereal Time at a UT1 Julian Date, radians in [0, 2π).
///
/// GMST = ERA + 0.014506 + 4612.156534·T + 1.3915817·T² − 0.00000044·T³
///        − 0.000029956·T⁴ − 0.0000000368·T⁵ (arcseconds).
pub fn gmst_rad(jd_ut1: f64) -> f64 {
    let era = earth_rotation_angle_rad(jd_ut1);
    let t = (jd_ut1 - J2000_JD) / 36525.0;
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let t5 = t4 * t;

    let poly_arcsec = 0.014506 + 4612.156534 * t + 1.3915817 * t2
        - 0.00000044 * t3
        - 0.000029956 * t4
        - 0.0000000368 * t5;

    (era + poly_arcsec * ARCSEC_TO_RAD).rem_euclid(TAU)
}

/// GMST in degrees, [0, 360).
pub fn gmst_deg(jd_ut1: f64) -> f64 {
    gmst_rad(jd_ut1).to_degrees().rem_euclid(360.0)
}

/// Local sidereal time from GMST and east longitude, radians in [0, 2π).
pub fn local_sidereal_time_rad(gmst: f64, longitude_east_rad: f64) -> f64 {
    (gmst + longitude_east_rad).rem_euclid(TAU)
}

/// Local sidereal time in degrees for a UT1 Julian Date and east longitude.
pub fn local_sidereal_time_deg(jd_ut1: f64, longitude_east_deg: f64) -> f64 {
    (gmst_deg(jd_ut1) + longitude_east_deg).rem_euclid(360.0)
}
