//! House-cusp computation for Placidus, Whole-Sign and Equal.

use janma_frames::{angular_separation_deg, arc_forward_deg, normalize_deg};
use tracing::debug;

use crate::angles::{ascendant_deg, meridian_points_deg, upper_meridian_deg};
use crate::error::HouseError;
use crate::placidus::{intermediate_cusps, polar_limit_deg, western_cusps};
use crate::types::{HOUSE_FRAME, HouseInputs, HouseResult, HouseSystem, MCHemisphere};

/// Tolerance for the 30° spacing of Equal and Whole-Sign cusps.
pub const SPACING_TOLERANCE_DEG: f64 = 1e-6;
/// Tolerance for opposite Placidus cusps being antipodal.
pub const AXIS_TOLERANCE_DEG: f64 = 1e-3;

/// Ascendant, midheaven and cusps for `system`.
///
/// The midheaven is the meridian point chosen by `mc_hemisphere`. For
/// Placidus the chosen point is cusp 10; when it is the lower meridian
/// intersection the whole meridian axis, and with it every intermediate
/// cusp, turns by 180°. Equal and Whole-Sign cusps depend only on the
/// ascendant.
pub fn compute(
    inputs: &HouseInputs,
    system: HouseSystem,
    mc_hemisphere: MCHemisphere,
) -> Result<HouseResult, HouseError> {
    inputs.validate()?;
    let HouseInputs {
        local_sidereal_time_deg: lst,
        latitude_deg: lat,
        obliquity_deg: eps,
    } = *inputs;

    if system == HouseSystem::Placidus {
        let limit = polar_limit_deg(eps);
        if lat.abs() >= limit {
            return Err(HouseError::PolarUndefined {
                latitude: lat,
                limit,
            });
        }
    }

    let ascendant = ascendant_deg(lst, lat, eps);
    let (south, north) = meridian_points_deg(lst, lat, eps);
    let midheaven = match mc_hemisphere.resolve(lat) {
        MCHemisphere::North => north,
        _ => south,
    };

    let cusps = match system {
        HouseSystem::Equal => equal_cusps(ascendant),
        HouseSystem::WholeSign => whole_sign_cusps(ascendant),
        HouseSystem::Placidus => {
            let upper = upper_meridian_deg(lst, eps);
            let flipped = angular_separation_deg(midheaven, upper) > 90.0;
            placidus_cusps(ascendant, upper, lst, lat, eps, flipped)?
        }
    };

    let result = HouseResult {
        system,
        frame: HOUSE_FRAME,
        ascendant,
        midheaven,
        cusps,
    };
    check_invariants(&result)?;
    debug!(%system, asc = ascendant, mc = midheaven, "houses computed");
    Ok(result)
}

/// `asc + 30° i`.
pub fn equal_cusps(ascendant: f64) -> [f64; 12] {
    std::array::from_fn(|i| normalize_deg(ascendant + 30.0 * i as f64))
}

/// Sign boundaries starting with the ascendant's sign.
pub fn whole_sign_cusps(ascendant: f64) -> [f64; 12] {
    let first = (ascendant / 30.0).floor() * 30.0;
    std::array::from_fn(|i| normalize_deg(first + 30.0 * i as f64))
}

fn placidus_cusps(
    ascendant: f64,
    upper_mc: f64,
    lst: f64,
    lat: f64,
    eps: f64,
    flipped: bool,
) -> Result<[f64; 12], HouseError> {
    let [c2, c3, c11, c12] = intermediate_cusps(lst, lat, eps)?;
    let [c5, c6, c8, c9] = western_cusps(lst, lat, eps)?;
    let mut cusps = [
        ascendant,
        c2,
        c3,
        normalize_deg(upper_mc + 180.0),
        c5,
        c6,
        normalize_deg(ascendant + 180.0),
        c8,
        c9,
        upper_mc,
        c11,
        c12,
    ];

    if flipped {
        for (i, cusp) in cusps.iter_mut().enumerate() {
            if i % 6 != 0 {
                *cusp = normalize_deg(*cusp + 180.0);
            }
        }
    }
    Ok(cusps)
}

/// Geometric checks every result must pass before it leaves the solver.
///
/// Placidus solves the eastern and western intermediate cusps separately,
/// so their opposition to within [`AXIS_TOLERANCE_DEG`] is a real check on
/// the solver. For Equal and Whole-Sign the midheaven is reported on its own
/// and is not tied to cusp 10; only the 30° spacing, and for Equal the
/// ascendant on cusp 1, are checked.
pub fn check_invariants(result: &HouseResult) -> Result<(), HouseError> {
    let c = &result.cusps;
    if c.iter().any(|v| !v.is_finite() || !(0.0..360.0).contains(v)) {
        return Err(HouseError::InvariantViolated("cusp outside [0, 360)".into()));
    }
    if angular_separation_deg(c[6], result.ascendant) < 180.0 - 1e-9 {
        return Err(HouseError::InvariantViolated(format!(
            "cusp 7 ({}) is not opposite the ascendant ({})",
            c[6], result.ascendant
        )));
    }
    match result.system {
        HouseSystem::Equal | HouseSystem::WholeSign => {
            if result.system == HouseSystem::Equal && c[0] != result.ascendant {
                return Err(HouseError::InvariantViolated(
                    "equal cusp 1 differs from the ascendant".into(),
                ));
            }
            for i in 0..12 {
                let step = arc_forward_deg(c[i], c[(i + 1) % 12]);
                if (step - 30.0).abs() > SPACING_TOLERANCE_DEG {
                    return Err(HouseError::InvariantViolated(format!(
                        "cusps {} and {} are {step}° apart",
                        i + 1,
                        (i + 1) % 12 + 1
                    )));
                }
            }
        }
        HouseSystem::Placidus => {
            if angular_separation_deg(c[9], result.midheaven) > 1e-9 {
                return Err(HouseError::InvariantViolated(
                    "cusp 10 differs from the midheaven".into(),
                ));
            }
            for i in 0..6 {
                let sep = angular_separation_deg(c[i], c[i + 6]);
                if (sep - 180.0).abs() > AXIS_TOLERANCE_DEG {
                    return Err(HouseError::InvariantViolated(format!(
                        "cusps {} and {} are {sep}° apart",
                        i + 1,
                        i + 7
                    )));
                }
            }
        }
    }
    Ok(())
}

impl HouseResult {
    /// The same houses measured from a sidereal zero point `ayanamsa_deg`
    /// behind the equinox. Whole-Sign boundaries are re-taken in the
    /// sidereal zodiac.
    pub fn to_sidereal(&self, ayanamsa_deg: f64) -> Result<HouseResult, HouseError> {
        if ayanamsa_deg == 0.0 {
            return Ok(*self);
        }
        let ascendant = normalize_deg(self.ascendant - ayanamsa_deg);
        let cusps = match self.system {
            HouseSystem::Equal => equal_cusps(ascendant),
            HouseSystem::WholeSign => whole_sign_cusps(ascendant),
            HouseSystem::Placidus => self.cusps.map(|c| normalize_deg(c - ayanamsa_deg)),
        };
        let shifted = HouseResult {
            ascendant,
            midheaven: normalize_deg(self.midheaven - ayanamsa_deg),
            cusps,
            ..*self
        };
        check_invariants(&shifted)?;
        Ok(shifted)
    }
}
