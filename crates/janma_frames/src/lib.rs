//! Reference-frame helpers for ecliptic-of-date work.
//!
//! - angle normalisation and arc arithmetic
//! - IAU 2006 mean obliquity of the ecliptic
//! - IAU 2006 general precession in longitude
//! - ecliptic ↔ equatorial conversions and Cartesian → spherical

pub mod angle;
pub mod obliquity;
pub mod precession;
pub mod spherical;

pub use angle::{angular_separation_deg, arc_forward_deg, normalize_deg, normalize_signed_deg};
pub use obliquity::{OBLIQUITY_MODEL, mean_obliquity_arcsec, mean_obliquity_deg};
pub use precession::{general_precession_longitude_arcsec, general_precession_longitude_deg};
pub use spherical::{
    EclipticCoords, EquatorialCoords, SphericalCoords, cartesian_to_spherical,
    ecliptic_to_equatorial, equatorial_to_ecliptic, ra_to_ecliptic_longitude_deg,
};
