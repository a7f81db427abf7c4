//! IAU 2006 mean obliquity of the ecliptic.
//!
//! ε_A = 84381.406 − 46.836769·T − 0.0001831·T² + 0.00200340·T³
//!       − 0.000000576·T⁴ − 0.0000000434·T⁵  (arcseconds)
//!
//! Source: Capitaine, Wallace & Chapront 2003 (P03), IERS Conventions 2010
//! Eq. 5.40. Public domain.

/// Name reported alongside results computed with this model.
pub const OBLIQUITY_MODEL: &str = "IAU2006";

/// Mean obliquity in arcseconds at `t` Julian centuries since J2000.0.
pub fn mean_obliquity_arcsec(t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let t5 = t4 * t;
    84381.406 - 46.836769 * t - 0.0001831 * t2 + 0.00200340 * t3
        - 0.000000576 * t4
        - 0.0000000434 * t5
}

/// Mean obliquity in degrees.
pub fn mean_obliquity_deg(t: f64) -> f64 {
    mean_obliquity_arcsec(t) / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn j2000_value() {
        assert!((mean_obliquity_deg(0.0) - 23.439_279_444).abs() < 1e-9);
    }

    #[test]
    fn unix_epoch_value() {
        let t = (2_440_587.5 - 2_451_545.0) / 36525.0;
        assert!((mean_obliquity_deg(t) - 23.443_182_5).abs() < 1e-6);
    }

    #[test]
    fn decreasing_now() {
        assert!(mean_obliquity_deg(0.1) < mean_obliquity_deg(0.0));
    }
}
