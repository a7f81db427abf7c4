//! Spherical coordinates and ecliptic ↔ equatorial rotation.
//!
//! The rotation is about the common x-axis (the equinox direction) by the
//! obliquity ε. Both frames are "of date" when ε is the obliquity of date.

use crate::angle::normalize_deg;

/// Spherical coordinates: longitude, latitude, distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalCoords {
    /// Longitude in degrees, [0, 360).
    pub lon_deg: f64,
    /// Latitude in degrees, [-90, 90].
    pub lat_deg: f64,
    /// Distance from origin, same unit as the input vector.
    pub distance: f64,
}

/// Convert Cartesian `[x, y, z]` to spherical coordinates.
pub fn cartesian_to_spherical(xyz: &[f64; 3]) -> SphericalCoords {
    let [x, y, z] = *xyz;
    let r = (x * x + y * y + z * z).sqrt();
    if r == 0.0 {
        return SphericalCoords {
            lon_deg: 0.0,
            lat_deg: 0.0,
            distance: 0.0,
        };
    }
    SphericalCoords {
        lon_deg: normalize_deg(y.atan2(x).to_degrees()),
        lat_deg: (z / r).clamp(-1.0, 1.0).asin().to_degrees(),
        distance: r,
    }
}

/// Ecliptic longitude/latitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipticCoords {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

/// Right ascension/declination in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquatorialCoords {
    pub ra_deg: f64,
    pub dec_deg: f64,
}

/// Rotate ecliptic coordinates into the equator of the same date.
pub fn ecliptic_to_equatorial(ecl: EclipticCoords, obliquity_deg: f64) -> EquatorialCoords {
    let (sl, cl) = ecl.lon_deg.to_radians().sin_cos();
    let (sb, cb) = ecl.lat_deg.to_radians().sin_cos();
    let (se, ce) = obliquity_deg.to_radians().sin_cos();

    let x = cb * cl;
    let y = cb * sl * ce - sb * se;
    let z = cb * sl * se + sb * ce;

    EquatorialCoords {
        ra_deg: normalize_deg(y.atan2(x).to_degrees()),
        dec_deg: z.clamp(-1.0, 1.0).asin().to_degrees(),
    }
}

/// Rotate equatorial coordinates onto the ecliptic of the same date.
pub fn equatorial_to_ecliptic(eq: EquatorialCoords, obliquity_deg: f64) -> EclipticCoords {
    let (sa, ca) = eq.ra_deg.to_radians().sin_cos();
    let (sd, cd) = eq.dec_deg.to_radians().sin_cos();
    let (se, ce) = obliquity_deg.to_radians().sin_cos();

    let x = cd * ca;
    let y = cd * sa * ce + sd * se;
    let z = -cd * sa * se + sd * ce;

    EclipticCoords {
        lon_deg: normalize_deg(y.atan2(x).to_degrees()),
        lat_deg: z.clamp(-1.0, 1.0).asin().to_degrees(),
    }
}

/// Ecliptic longitude of the ecliptic point whose right ascension is `ra_deg`.
///
/// λ = atan2(sin α, cos α · cos ε). The result lies in the same quadrant as α.
pub fn ra_to_ecliptic_longitude_deg(ra_deg: f64, obliquity_deg: f64) -> f64 {
    let (sa, ca) = ra_deg.to_radians().sin_cos();
    let ce = obliquity_deg.to_radians().cos();
    normalize_deg(sa.atan2(ca * ce).to_degrees())
}
