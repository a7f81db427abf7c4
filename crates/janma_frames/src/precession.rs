//! IAU 2006 general precession in ecliptic longitude.
//!
//! p_A is the accumulated westward motion of the equinox along the ecliptic
//! since J2000.0; mean ayanamsa values are J2000 references advanced by it.
//!
//! Source: Capitaine, Wallace & Chapront 2003, A&A 412, 567-586 (Table 1).

/// General precession in arcseconds at `t` Julian centuries since J2000.0.
///
/// Linear term ≈ 5028.80″/century ≈ 1.3969°/century.
pub fn general_precession_longitude_arcsec(t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let t5 = t4 * t;
    5028.796195 * t + 1.1054348 * t2 + 0.00007964 * t3 - 0.000023857 * t4 - 0.0000000383 * t5
}

/// General precession in degrees.
pub fn general_precession_longitude_deg(t: f64) -> f64 {
    general_precession_longitude_arcsec(t) / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_at_j2000() {
        assert_eq!(general_precession_longitude_arcsec(0.0), 0.0);
    }

    #[test]
    fn rate_per_year() {
        let p = general_precession_longitude_arcsec(0.01);
        assert!((p - 50.29).abs() < 0.1, "p_A(0.01) = {p}");
    }

    #[test]
    fn negative_before_j2000() {
        let p = general_precession_longitude_deg(-0.3);
        assert!(p < 0.0 && p > -0.5, "p_A(-0.3) = {p}");
    }
}
