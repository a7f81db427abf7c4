//! Angle normalisation.

/// Normalise degrees into [0, 360).
pub fn normalize_deg(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs.
    if r >= 360.0 { 0.0 } else { r }
}

/// Normalise degrees into (-180, 180].
pub fn normalize_signed_deg(deg: f64) -> f64 {
    let r = normalize_deg(deg);
    if r > 180.0 { r - 360.0 } else { r }
}

/// Forward (counter-clockwise) arc from `from` to `to`, in [0, 360).
pub fn arc_forward_deg(from: f64, to: f64) -> f64 {
    normalize_deg(to - from)
}

/// Smallest unsigned separation between two longitudes, in [0, 180].
pub fn angular_separation_deg(a: f64, b: f64) -> f64 {
    normalize_signed_deg(a - b).abs()
}
