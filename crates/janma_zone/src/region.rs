//! Geographic regions used by zone patches.

use serde::Deserialize;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A closed area on the globe. Longitudes are east-positive degrees.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum Region {
    /// Latitude/longitude box. `min_lon > max_lon` wraps across the antimeridian.
    Bbox {
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
    },
    /// Simple polygon as `[lat, lon]` vertices (implicitly closed).
    Polygon { points: Vec<[f64; 2]> },
    /// Great-circle disc around a centre point.
    Circle { lat: f64, lon: f64, radius_km: f64 },
}

impl Region {
    /// Whether the point lies inside (boundary inclusive for boxes and discs).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        match self {
            Self::Bbox {
                min_lat,
                max_lat,
                min_lon,
                max_lon,
            } => {
                if lat < *min_lat || lat > *max_lat {
                    return false;
                }
                if min_lon <= max_lon {
                    (*min_lon..=*max_lon).contains(&lon)
                } else {
                    lon >= *min_lon || lon <= *max_lon
                }
            }
            Self::Polygon { points } => polygon_contains(points, lat, lon),
            Self::Circle {
                lat: clat,
                lon: clon,
                radius_km,
            } => haversine_km(*clat, *clon, lat, lon) <= *radius_km,
        }
    }

    /// Structural sanity check for data loaded from files.
    pub fn validate(&self) -> Result<(), &'static str> {
        let lat_ok = |v: f64| v.is_finite() && (-90.0..=90.0).contains(&v);
        let lon_ok = |v: f64| v.is_finite() && (-180.0..=180.0).contains(&v);
        match self {
            Self::Bbox {
                min_lat,
                max_lat,
                min_lon,
                max_lon,
            } => {
                if !(lat_ok(*min_lat) && lat_ok(*max_lat) && lon_ok(*min_lon) && lon_ok(*max_lon)) {
                    return Err("bbox coordinates out of range");
                }
                if min_lat > max_lat {
                    return Err("bbox min_lat exceeds max_lat");
                }
            }
            Self::Polygon { points } => {
                if points.len() < 3 {
                    return Err("polygon needs at least three vertices");
                }
                if points.iter().any(|p| !(lat_ok(p[0]) && lon_ok(p[1]))) {
                    return Err("polygon vertex out of range");
                }
            }
            Self::Circle {
                lat,
                lon,
                radius_km,
            } => {
                if !(lat_ok(*lat) && lon_ok(*lon)) {
                    return Err("circle centre out of range");
                }
                if !(radius_km.is_finite() && *radius_km > 0.0) {
                    return Err("circle radius must be positive");
                }
            }
        }
        Ok(())
    }
}

/// Even-odd ray casting in the lat/lon plane.
fn polygon_contains(points: &[[f64; 2]], lat: f64, lon: f64) -> bool {
    let mut inside = false;
    let mut j = points.len().wrapping_sub(1);
    for (i, pi) in points.iter().enumerate() {
        let pj = points[j];
        let (yi, xi) = (pi[0], pi[1]);
        let (yj, xj) = (pj[0], pj[1]);
        if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (p1, p2) = (lat1.to_radians(), lat2.to_radians());
    let dp = p2 - p1;
    let dl = (lon2 - lon1).to_radians();
    let a = (dp / 2.0).sin().powi(2) + p1.cos() * p2.cos() * (dl / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().clamp(0.0, 1.0).asin()
}
