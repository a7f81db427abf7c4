//! Placidus intermediate cusps by semi-arc trisection.
//!
//! Cusp 11 is the ecliptic point whose right ascension exceeds RAMC by a
//! third of its own diurnal semi-arc; cusp 12 by two thirds. Cusps 3 and 2
//! precede the IC (RAMC + 180°) by one and two thirds of their nocturnal
//! semi-arcs. The western cusps mirror these: 9 and 8 precede RAMC, 5 and 6
//! follow the IC. Because the semi-arc depends on the point's declination, each
//! cusp is a root of `x = f · SA(base ± x)`.
//!
//! Fixed-point iteration from the equatorial seed `x₀ = f · 90°` converges
//! quickly at moderate latitudes; bisection on `[0, 180° f]` takes over when
//! it does not.

use janma_frames::ra_to_ecliptic_longitude_deg;
use tracing::debug;

use crate::error::HouseError;

/// Convergence tolerance on the hour-angle offset, degrees.
pub const TOLERANCE_DEG: f64 = 1e-9;
const MAX_FIXED_POINT_ITERATIONS: usize = 100;
const MAX_BISECTION_ITERATIONS: usize = 200;

/// Latitude beyond which some ecliptic points are circumpolar.
pub fn polar_limit_deg(obliquity_deg: f64) -> f64 {
    90.0 - obliquity_deg
}

#[derive(Debug, Clone, Copy)]
enum Arc {
    Diurnal,
    Nocturnal,
}

/// Diurnal or nocturnal semi-arc of the ecliptic point at right ascension
/// `ra_deg`, degrees.
fn semi_arc_deg(ra_deg: f64, tan_lat: f64, tan_eps: f64, arc: Arc) -> f64 {
    // tan δ = tan ε sin α for points on the ecliptic.
    let tan_dec = tan_eps * ra_deg.to_radians().sin();
    let diurnal = (-(tan_dec * tan_lat)).clamp(-1.0, 1.0).acos().to_degrees();
    match arc {
        Arc::Diurnal => diurnal,
        Arc::Nocturnal => 180.0 - diurnal,
    }
}

struct CuspEquation {
    base: f64,
    sign: f64,
    fraction: f64,
    arc: Arc,
    tan_lat: f64,
    tan_eps: f64,
}

impl CuspEquation {
    fn ra(&self, x: f64) -> f64 {
        self.base + self.sign * x
    }

    fn image(&self, x: f64) -> f64 {
        self.fraction * semi_arc_deg(self.ra(x), self.tan_lat, self.tan_eps, self.arc)
    }

    fn solve(&self) -> Option<f64> {
        let mut x = self.fraction * 90.0;
        for _ in 0..MAX_FIXED_POINT_ITERATIONS {
            let next = self.image(x);
            if !next.is_finite() {
                break;
            }
            if (next - x).abs() < TOLERANCE_DEG {
                return Some(next);
            }
            x = next;
        }
        debug!(fraction = self.fraction, "fixed point stalled, bisecting");
        self.bisect()
    }

    fn bisect(&self) -> Option<f64> {
        // h(0) <= 0 and h(180 f) >= 0 because the semi-arc lies in [0, 180].
        let h = |x: f64| x - self.image(x);
        let (mut lo, mut hi) = (0.0, 180.0 * self.fraction);
        if !(h(lo) <= 0.0 && h(hi) >= 0.0) {
            return None;
        }
        for _ in 0..MAX_BISECTION_ITERATIONS {
            let mid = 0.5 * (lo + hi);
            if h(mid) <= 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo < TOLERANCE_DEG {
                return Some(0.5 * (lo + hi));
            }
        }
        None
    }
}

/// One intermediate cusp: `RA = base + sign · x` with `x = fraction · SA`.
#[derive(Debug, Clone, Copy)]
struct CuspSpec {
    house: u8,
    lower: bool,
    sign: f64,
    fraction: f64,
    arc: Arc,
}

const fn spec(house: u8, lower: bool, sign: f64, fraction: f64, arc: Arc) -> CuspSpec {
    CuspSpec {
        house,
        lower,
        sign,
        fraction,
        arc,
    }
}

const EASTERN: [CuspSpec; 4] = [
    spec(2, true, -1.0, 2.0 / 3.0, Arc::Nocturnal),
    spec(3, true, -1.0, 1.0 / 3.0, Arc::Nocturnal),
    spec(11, false, 1.0, 1.0 / 3.0, Arc::Diurnal),
    spec(12, false, 1.0, 2.0 / 3.0, Arc::Diurnal),
];

const WESTERN: [CuspSpec; 4] = [
    spec(5, true, 1.0, 1.0 / 3.0, Arc::Nocturnal),
    spec(6, true, 1.0, 2.0 / 3.0, Arc::Nocturnal),
    spec(8, false, -1.0, 2.0 / 3.0, Arc::Diurnal),
    spec(9, false, -1.0, 1.0 / 3.0, Arc::Diurnal),
];

fn solve_cusps(
    specs: &[CuspSpec; 4],
    ramc_deg: f64,
    latitude_deg: f64,
    obliquity_deg: f64,
) -> Result<[f64; 4], HouseError> {
    let tan_lat = latitude_deg.to_radians().tan();
    let tan_eps = obliquity_deg.to_radians().tan();
    let mut out = [0.0; 4];
    for (slot, s) in out.iter_mut().zip(specs) {
        let eq = CuspEquation {
            base: if s.lower { ramc_deg + 180.0 } else { ramc_deg },
            sign: s.sign,
            fraction: s.fraction,
            arc: s.arc,
            tan_lat,
            tan_eps,
        };
        let x = eq.solve().ok_or(HouseError::NonConvergent { cusp: s.house })?;
        *slot = ra_to_ecliptic_longitude_deg(eq.ra(x), obliquity_deg);
    }
    Ok(out)
}

/// Cusps 2, 3, 11 and 12 as `[c2, c3, c11, c12]`, relative to the upper
/// meridian at `ramc_deg`.
///
/// Callers must have applied the polar guard.
pub(crate) fn intermediate_cusps(
    ramc_deg: f64,
    latitude_deg: f64,
    obliquity_deg: f64,
) -> Result<[f64; 4], HouseError> {
    solve_cusps(&EASTERN, ramc_deg, latitude_deg, obliquity_deg)
}

/// Cusps 5, 6, 8 and 9 as `[c5, c6, c8, c9]`, each solved from its own
/// semi-arc rather than as the antipode of an eastern cusp.
pub(crate) fn western_cusps(
    ramc_deg: f64,
    latitude_deg: f64,
    obliquity_deg: f64,
) -> Result<[f64; 4], HouseError> {
    solve_cusps(&WESTERN, ramc_deg, latitude_deg, obliquity_deg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equator_semi_arc_is_quarter_turn() {
        for ra in [0.0, 37.0, 90.0, 250.0] {
            assert!((semi_arc_deg(ra, 0.0, 0.43, Arc::Diurnal) - 90.0).abs() < 1e-12);
            assert!((semi_arc_deg(ra, 0.0, 0.43, Arc::Nocturnal) - 90.0).abs() < 1e-12);
        }
    }

    #[test]
    fn summer_points_have_long_days_in_the_north() {
        let tan_lat = 50f64.to_radians().tan();
        let tan_eps = 23.44f64.to_radians().tan();
        assert!(semi_arc_deg(90.0, tan_lat, tan_eps, Arc::Diurnal) > 90.0);
        assert!(semi_arc_deg(270.0, tan_lat, tan_eps, Arc::Diurnal) < 90.0);
    }

    #[test]
    fn equator_cusps_are_equal_ra_division() {
        // At φ = 0 every semi-arc is 90°, so cusps sit at RAMC ± 30° steps.
        let c = intermediate_cusps(0.0, 0.0, 23.44).unwrap();
        let expect = |ra: f64| ra_to_ecliptic_longitude_deg(ra, 23.44);
        assert!((c[0] - expect(120.0)).abs() < 1e-9);
        assert!((c[1] - expect(150.0)).abs() < 1e-9);
        assert!((c[2] - expect(30.0)).abs() < 1e-9);
        assert!((c[3] - expect(60.0)).abs() < 1e-9);
    }

    #[test]
    fn bisection_agrees_with_fixed_point() {
        let eq = CuspEquation {
            base: 100.0,
            sign: 1.0,
            fraction: 1.0 / 3.0,
            arc: Arc::Diurnal,
            tan_lat: 60f64.to_radians().tan(),
            tan_eps: 23.44f64.to_radians().tan(),
        };
        let a = eq.solve().unwrap();
        let b = eq.bisect().unwrap();
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn western_cusps_are_antipodes_of_eastern() {
        for (ramc, lat) in [(100.0, 40.0), (10.0, -55.0), (275.0, 62.0)] {
            let [c2, c3, c11, c12] = intermediate_cusps(ramc, lat, 23.44).unwrap();
            let [c5, c6, c8, c9] = western_cusps(ramc, lat, 23.44).unwrap();
            for (east, west) in [(c2, c8), (c3, c9), (c11, c5), (c12, c6)] {
                let sep = janma_frames::angular_separation_deg(east, west);
                assert!((sep - 180.0).abs() < 1e-6, "ramc {ramc} lat {lat}: {east} vs {west}");
            }
        }
    }

    #[test]
    fn polar_limit() {
        assert!((polar_limit_deg(23.44) - 66.56).abs() < 1e-12);
    }
}
