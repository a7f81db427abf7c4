//! Request and response shapes exchanged with an outer transport.
//!
//! Requests deserialize from JSON/TOML-like maps; responses serialize with
//! the field names clients see.

use chrono::{DateTime, NaiveDateTime, Utc};
use janma_ephem::{Body, BodySet, ECLIPTIC_FRAME};
use janma_houses::{Ayanamsa, HouseSystem, MCHemisphere};
use janma_pool::PoolHealth;
use janma_time::{Ut1Source, parse_local_datetime, parse_utc_instant};
use janma_zone::{ParityProfile, ResolvedTime};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::{SERVICE_NAME, VERSION};

/// Reported with every position and house response.
pub const COORDINATE_SYSTEM: &str = "geocentric";
pub const ECLIPTIC_MODEL: &str = "IAU2006";

pub const MIN_ELEVATION_M: f64 = -500.0;
pub const MAX_ELEVATION_M: f64 = 10_000.0;

/// A birth time as supplied: an instant, or a wall-clock reading that the
/// time resolver still has to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BirthTime {
    Utc(DateTime<Utc>),
    Local(NaiveDateTime),
}

impl BirthTime {
    /// `Z` or an explicit offset makes an instant; anything else is local.
    pub fn parse(input: &str) -> Result<Self, ServiceError> {
        if let Ok(utc) = parse_utc_instant(input) {
            return Ok(Self::Utc(utc));
        }
        Ok(Self::Local(parse_local_datetime(input)?))
    }
}

pub fn validate_elevation(elevation_m: f64) -> Result<(), ServiceError> {
    if elevation_m.is_finite() && (MIN_ELEVATION_M..=MAX_ELEVATION_M).contains(&elevation_m) {
        Ok(())
    } else {
        Err(ServiceError::invalid_input(format!(
            "elevation {elevation_m} m outside [{MIN_ELEVATION_M}, {MAX_ELEVATION_M}]"
        )))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub local_datetime: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Service default when absent.
    #[serde(default)]
    pub parity_profile: Option<ParityProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionsRequest {
    pub birth_time: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Metres above sea level; validated and echoed, not applied.
    #[serde(default)]
    pub elevation: f64,
    #[serde(default)]
    pub ayanamsa: Ayanamsa,
    /// Houses are added to the response when a system is named.
    #[serde(default)]
    pub system: Option<HouseSystem>,
    #[serde(default)]
    pub mc_hemisphere: MCHemisphere,
    #[serde(default)]
    pub parity_profile: Option<ParityProfile>,
    /// All supported bodies when absent.
    #[serde(default)]
    pub bodies: Option<Vec<Body>>,
}

impl PositionsRequest {
    pub fn body_set(&self) -> BodySet {
        match &self.bodies {
            Some(list) => list.iter().copied().collect(),
            None => BodySet::all(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousesRequest {
    pub birth_time: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation: f64,
    #[serde(default)]
    pub ayanamsa: Ayanamsa,
    #[serde(default = "default_system")]
    pub system: HouseSystem,
    #[serde(default)]
    pub mc_hemisphere: MCHemisphere,
    #[serde(default)]
    pub parity_profile: Option<ParityProfile>,
}

fn default_system() -> HouseSystem {
    HouseSystem::Placidus
}

/// Tags identifying how a response was computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub ecliptic_frame: &'static str,
    pub coordinate_system: &'static str,
    pub ecliptic_model: &'static str,
    pub obliquity_model: &'static str,
    pub obliquity_deg: f64,
    pub ayanamsa: &'static str,
    pub ayanamsa_deg: f64,
    pub kernel_bundle: &'static str,
    /// `eop` when UT1 came from an IERS table, else `utc`.
    pub ut1_source: &'static str,
    pub elevation_m: f64,
    pub service: &'static str,
    pub version: &'static str,
}

impl Metadata {
    pub(crate) fn new(
        obliquity_deg: f64,
        ayanamsa: Ayanamsa,
        ayanamsa_deg: f64,
        kernel_bundle: &'static str,
        ut1_source: Ut1Source,
        elevation_m: f64,
    ) -> Self {
        Self {
            ecliptic_frame: ECLIPTIC_FRAME,
            coordinate_system: COORDINATE_SYSTEM,
            ecliptic_model: ECLIPTIC_MODEL,
            obliquity_model: janma_frames::OBLIQUITY_MODEL,
            obliquity_deg,
            ayanamsa: ayanamsa.as_str(),
            ayanamsa_deg,
            kernel_bundle,
            ut1_source: match ut1_source {
                Ut1Source::Eop => "eop",
                Ut1Source::UtcApprox => "utc",
            },
            elevation_m,
            service: SERVICE_NAME,
            version: VERSION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyEntry {
    pub body: Body,
    /// In the requested zodiac.
    pub longitude: f64,
    pub latitude: f64,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionsResponse {
    pub utc: DateTime<Utc>,
    /// Present when the birth time was local.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedTime>,
    pub bodies: Vec<BodyEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub houses: Option<HousesResponse>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HousesResponse {
    pub system: HouseSystem,
    pub frame: &'static str,
    pub coordinate_system: &'static str,
    pub ecliptic_model: &'static str,
    pub ayanamsa: Ayanamsa,
    pub mc_hemisphere: MCHemisphere,
    pub asc: f64,
    pub mc: f64,
    pub cusps: [f64; 12],
    pub local_sidereal_time_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HousesEnvelope {
    pub utc: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedTime>,
    #[serde(flatten)]
    pub houses: HousesResponse,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeHealth {
    pub tzdb_version: &'static str,
    pub parity_profile_default: ParityProfile,
    pub patches: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthResponse {
    #[serde(flatten)]
    pub pool: PoolHealth,
    pub time: TimeHealth,
    pub service: &'static str,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn birth_time_with_offset_is_an_instant() {
        assert_eq!(
            BirthTime::parse("1970-01-01T05:30:00+05:30").unwrap(),
            BirthTime::Utc(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap())
        );
        assert!(matches!(
            BirthTime::parse("1962-07-02T23:33:00").unwrap(),
            BirthTime::Local(_)
        ));
        let err = BirthTime::parse("July 2nd").unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::InvalidInput);
    }

    #[test]
    fn elevation_bounds() {
        validate_elevation(-500.0).unwrap();
        validate_elevation(8848.0).unwrap();
        assert!(validate_elevation(10_001.0).is_err());
        assert!(validate_elevation(f64::NAN).is_err());
    }

    #[test]
    fn request_defaults() {
        let r: HousesRequest = serde_json::from_str(
            r#"{"birth_time":"1970-01-01T00:00:00Z","latitude":0.0,"longitude":0.0}"#,
        )
        .unwrap();
        assert_eq!(r.system, HouseSystem::Placidus);
        assert_eq!(r.ayanamsa, Ayanamsa::Tropical);
        assert_eq!(r.mc_hemisphere, MCHemisphere::Auto);
        assert_eq!(r.elevation, 0.0);

        let p: PositionsRequest = serde_json::from_str(
            r#"{"birth_time":"1970-01-01T00:00:00Z","latitude":0.0,"longitude":0.0,
                "ayanamsa":"fagan_bradley","bodies":["sun","moon"]}"#,
        )
        .unwrap();
        assert_eq!(p.ayanamsa, Ayanamsa::FaganBradley);
        assert_eq!(p.body_set().len(), 2);
        assert!(p.system.is_none());
    }
}
