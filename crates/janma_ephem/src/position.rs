//! Body positions and per-instant snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::error::EphemerisError;
use crate::policy::KernelBundle;

/// Frame label reported with every position.
pub const ECLIPTIC_FRAME: &str = "ECLIPDATE";

/// Coordinate frame of returned positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frame {
    /// Geocentric ecliptic and mean equinox of date.
    #[serde(rename = "ECLIPDATE")]
    EclipticOfDate,
}

impl Frame {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EclipticOfDate => ECLIPTIC_FRAME,
        }
    }
}

/// Geocentric ecliptic-of-date position of one body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyPosition {
    pub body: Body,
    /// Ecliptic longitude in degrees, [0, 360).
    pub longitude: f64,
    /// Ecliptic latitude in degrees, [-90, 90].
    pub latitude: f64,
    /// Distance in AU, > 0.
    pub distance: f64,
}

impl BodyPosition {
    /// Check the value domains a backend must honour.
    pub fn validate(&self) -> Result<(), EphemerisError> {
        let ok = self.longitude.is_finite()
            && (0.0..360.0).contains(&self.longitude)
            && self.latitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && self.distance.is_finite()
            && self.distance > 0.0;
        if ok {
            Ok(())
        } else {
            Err(EphemerisError::InvalidOutput(format!(
                "{}: lon {} lat {} dist {}",
                self.body, self.longitude, self.latitude, self.distance
            )))
        }
    }
}

/// Positions of a body set at one instant, plus the obliquity used for
/// equatorial work. Immutable once built; shared through the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemerisSnapshot {
    pub utc: DateTime<Utc>,
    pub frame: Frame,
    pub bundle: KernelBundle,
    pub obliquity_deg: f64,
    pub positions: Vec<BodyPosition>,
}

impl EphemerisSnapshot {
    pub fn position(&self, body: Body) -> Option<&BodyPosition> {
        self.positions.iter().find(|p| p.body == body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(lon: f64, lat: f64, dist: f64) -> BodyPosition {
        BodyPosition {
            body: Body::Mars,
            longitude: lon,
            latitude: lat,
            distance: dist,
        }
    }

    #[test]
    fn domains() {
        pos(0.0, 0.0, 1.0).validate().unwrap();
        pos(359.999, -90.0, 0.002).validate().unwrap();
        assert!(pos(360.0, 0.0, 1.0).validate().is_err());
        assert!(pos(10.0, 91.0, 1.0).validate().is_err());
        assert!(pos(10.0, 0.0, 0.0).validate().is_err());
        assert!(pos(f64::NAN, 0.0, 1.0).validate().is_err());
    }

    #[test]
    fn frame_label() {
        assert_eq!(Frame::EclipticOfDate.as_str(), "ECLIPDATE");
        assert_eq!(
            serde_json::to_string(&Frame::EclipticOfDate).unwrap(),
            "\"ECLIPDATE\""
        );
    }
}
