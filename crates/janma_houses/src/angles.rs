//! Ascendant and midheaven from sidereal time, latitude and obliquity.
//!
//! Sources: Meeus, "Astronomical Algorithms" (2nd ed), Ch. 13 and 14;
//! Montenbruck & Pfleger, "Astronomy on the Personal Computer".

use janma_frames::normalize_deg;

/// Ecliptic longitude of the ascendant, degrees in [0, 360).
///
/// `Asc = atan2(cos θ, -(sin θ cos ε + tan φ sin ε))`
///
/// Ill-conditioned as |φ| → 90°; at exactly ±90° `tan φ` is a large finite
/// number and the result degenerates towards the solstitial colure.
pub fn ascendant_deg(lst_deg: f64, latitude_deg: f64, obliquity_deg: f64) -> f64 {
    let (st, ct) = lst_deg.to_radians().sin_cos();
    let (se, ce) = obliquity_deg.to_radians().sin_cos();
    let tp = latitude_deg.to_radians().tan();
    normalize_deg(ct.atan2(-(st * ce + tp * se)).to_degrees())
}

/// Ecliptic longitude of the upper-meridian intersection, degrees.
///
/// `MC = atan2(sin θ, cos θ cos ε)`; same quadrant as θ.
pub fn upper_meridian_deg(lst_deg: f64, obliquity_deg: f64) -> f64 {
    let (st, ct) = lst_deg.to_radians().sin_cos();
    let ce = obliquity_deg.to_radians().cos();
    normalize_deg(st.atan2(ct * ce).to_degrees())
}

/// Declination of the ecliptic point at longitude `lon_deg` (latitude 0).
pub fn ecliptic_declination_deg(lon_deg: f64, obliquity_deg: f64) -> f64 {
    (obliquity_deg.to_radians().sin() * lon_deg.to_radians().sin())
        .asin()
        .to_degrees()
}

/// The two meridian–ecliptic intersections as `(south, north)`.
///
/// The southern one lies at a declination at or below the observer's
/// latitude. The pair is always exactly 180° apart.
pub fn meridian_points_deg(lst_deg: f64, latitude_deg: f64, obliquity_deg: f64) -> (f64, f64) {
    let upper = upper_meridian_deg(lst_deg, obliquity_deg);
    let lower = normalize_deg(upper + 180.0);
    if ecliptic_declination_deg(upper, obliquity_deg) <= latitude_deg {
        (upper, lower)
    } else {
        (lower, upper)
    }
}
