//! Inputs, options and results of house computation.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use janma_time::local_sidereal_time_deg;
use serde::{Deserialize, Serialize};

use crate::error::HouseError;

/// Frame label of every [`HouseResult`].
pub const HOUSE_FRAME: &str = "ecliptic-of-date";

/// Supported house division systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseSystem {
    /// Time-based trisection of diurnal and nocturnal semi-arcs.
    Placidus,
    /// Each sign is one house; house 1 is the ascendant's sign.
    WholeSign,
    /// 30° houses starting at the ascendant.
    Equal,
}

impl HouseSystem {
    pub const ALL: [HouseSystem; 3] = [Self::Placidus, Self::WholeSign, Self::Equal];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Placidus => "placidus",
            Self::WholeSign => "whole_sign",
            Self::Equal => "equal",
        }
    }

    /// Whether the cusps depend on geographic latitude beyond the ascendant.
    pub const fn is_quadrant(self) -> bool {
        matches!(self, Self::Placidus)
    }
}

impl Display for HouseSystem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HouseSystem {
    type Err = HouseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "placidus" | "p" => Ok(Self::Placidus),
            "whole_sign" | "wholesign" | "w" => Ok(Self::WholeSign),
            "equal" | "e" => Ok(Self::Equal),
            _ => Err(HouseError::InvalidSystem(s.to_string())),
        }
    }
}

/// Which meridian–ecliptic intersection serves as the midheaven.
///
/// The meridian meets the ecliptic at two points 180° apart. `South` takes
/// the one on the southern half of the meridian (declination below the
/// observer's latitude), `North` the other. `Auto` is `South` for
/// latitude ≥ 0 and `North` otherwise, which is the conventional upper MC
/// everywhere outside the tropics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MCHemisphere {
    North,
    South,
    #[default]
    Auto,
}

impl MCHemisphere {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::Auto => "auto",
        }
    }

    /// `Auto` resolved against a latitude.
    pub fn resolve(self, latitude_deg: f64) -> Self {
        match self {
            Self::Auto if latitude_deg >= 0.0 => Self::South,
            Self::Auto => Self::North,
            other => other,
        }
    }
}

impl Display for MCHemisphere {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MCHemisphere {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "north" => Ok(Self::North),
            "south" => Ok(Self::South),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown mc_hemisphere '{other}'")),
        }
    }
}

/// Everything the solver needs; all angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HouseInputs {
    /// Local mean sidereal time (RAMC).
    pub local_sidereal_time_deg: f64,
    pub latitude_deg: f64,
    pub obliquity_deg: f64,
}

impl HouseInputs {
    /// Inputs at a UT1 Julian date for an east-positive longitude.
    pub fn at(jd_ut1: f64, latitude_deg: f64, longitude_deg: f64, obliquity_deg: f64) -> Self {
        Self {
            local_sidereal_time_deg: local_sidereal_time_deg(jd_ut1, longitude_deg),
            latitude_deg,
            obliquity_deg,
        }
    }

    pub fn validate(&self) -> Result<(), HouseError> {
        if !self.local_sidereal_time_deg.is_finite() {
            return Err(HouseError::InvalidInput("sidereal time must be finite"));
        }
        if !self.latitude_deg.is_finite() || !(-90.0..=90.0).contains(&self.latitude_deg) {
            return Err(HouseError::InvalidInput("latitude must be within [-90, 90]"));
        }
        if !self.obliquity_deg.is_finite() || !(20.0..30.0).contains(&self.obliquity_deg) {
            return Err(HouseError::InvalidInput("obliquity must be within [20, 30)"));
        }
        Ok(())
    }
}

/// Ascendant, midheaven and twelve cusps in ecliptic longitude, degrees.
///
/// `cusps[0]` is the ascendant; `cusps[i]` and `cusps[i + 6]` are opposite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HouseResult {
    pub system: HouseSystem,
    pub frame: &'static str,
    pub ascendant: f64,
    pub midheaven: f64,
    pub cusps: [f64; 12],
}
