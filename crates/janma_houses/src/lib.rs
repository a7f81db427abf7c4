//! House-cusp solver.
//!
//! Given local sidereal time, geographic latitude and the obliquity of the
//! ecliptic, computes the ascendant, midheaven and twelve cusps under the
//! Placidus, Whole-Sign or Equal system. All longitudes are ecliptic of
//! date; sidereal results are produced with [`HouseResult::to_sidereal`]
//! and an [`Ayanamsa`].

pub mod angles;
pub mod ayanamsa;
pub mod error;
pub mod placidus;
pub mod solver;
pub mod types;

pub use angles::{ascendant_deg, ecliptic_declination_deg, meridian_points_deg, upper_meridian_deg};
pub use ayanamsa::Ayanamsa;
pub use error::HouseError;
pub use placidus::polar_limit_deg;
pub use solver::{
    AXIS_TOLERANCE_DEG, SPACING_TOLERANCE_DEG, check_invariants, compute, equal_cusps,
    whole_sign_cusps,
};
pub use types::{HOUSE_FRAME, HouseInputs, HouseResult, HouseSystem, MCHemisphere};
