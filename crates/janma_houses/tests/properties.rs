use janma_frames::{angular_separation_deg, arc_forward_deg};
use janma_houses::{
    HouseError, HouseInputs, HouseSystem, MCHemisphere, compute, polar_limit_deg,
};
use proptest::prelude::*;

fn inputs(lst: f64, lat: f64, eps: f64) -> HouseInputs {
    HouseInputs {
        local_sidereal_time_deg: lst,
        latitude_deg: lat,
        obliquity_deg: eps,
    }
}

proptest! {
    #[test]
    fn equal_and_whole_sign_spacing(
        lst in 0.0f64..360.0,
        lat in -89.0f64..89.0,
        eps in 22.0f64..24.5,
    ) {
        for system in [HouseSystem::Equal, HouseSystem::WholeSign] {
            let r = compute(&inputs(lst, lat, eps), system, MCHemisphere::Auto).unwrap();
            for i in 0..12 {
                let step = arc_forward_deg(r.cusps[i], r.cusps[(i + 1) % 12]);
                prop_assert!((step - 30.0).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn equal_first_cusp_is_exactly_ascendant(lst in 0.0f64..360.0, lat in -80.0f64..80.0) {
        let r = compute(&inputs(lst, lat, 23.44), HouseSystem::Equal, MCHemisphere::Auto).unwrap();
        prop_assert_eq!(r.cusps[0], r.ascendant);
    }

    #[test]
    fn placidus_opposites_antipodal(
        lst in 0.0f64..360.0,
        lat in -66.0f64..66.0,
        hemisphere in prop_oneof![
            Just(MCHemisphere::North),
            Just(MCHemisphere::South),
            Just(MCHemisphere::Auto),
        ],
    ) {
        let r = compute(&inputs(lst, lat, 23.44), HouseSystem::Placidus, hemisphere).unwrap();
        for i in 0..6 {
            let sep = angular_separation_deg(r.cusps[i], r.cusps[i + 6]);
            prop_assert!((sep - 180.0).abs() < 1e-3);
        }
        prop_assert!(angular_separation_deg(r.cusps[9], r.midheaven) < 1e-9);
    }

    #[test]
    fn placidus_fails_beyond_polar_guard(
        lst in 0.0f64..360.0,
        excess in 0.001f64..23.0,
        south in any::<bool>(),
    ) {
        let eps = 23.44;
        let lat = (polar_limit_deg(eps) + excess).min(90.0);
        let lat = if south { -lat } else { lat };
        let r = compute(&inputs(lst, lat, eps), HouseSystem::Placidus, MCHemisphere::Auto);
        let is_polar = matches!(r, Err(HouseError::PolarUndefined { .. }));
        prop_assert!(is_polar);
    }

    #[test]
    fn auto_matches_south_in_the_north(lst in 0.0f64..360.0, lat in 0.0f64..66.0) {
        let i = inputs(lst, lat, 23.44);
        let auto = compute(&i, HouseSystem::Placidus, MCHemisphere::Auto).unwrap();
        let south = compute(&i, HouseSystem::Placidus, MCHemisphere::South).unwrap();
        prop_assert_eq!(auto, south);
    }

    #[test]
    fn equator_meridian_points_differ_by_half_turn(lst in 0.0f64..360.0) {
        let i = inputs(lst, 0.0, 23.44);
        let n = compute(&i, HouseSystem::Equal, MCHemisphere::North).unwrap();
        let s = compute(&i, HouseSystem::Equal, MCHemisphere::South).unwrap();
        prop_assert!((angular_separation_deg(n.midheaven, s.midheaven) - 180.0).abs() < 1e-6);
    }
}
