//! Request and result types for civil-time resolution.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;
use crate::profile::ParityProfile;

/// A wall-clock birth reading at a place, to be turned into an instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CivilTimeRequest {
    pub local_datetime: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    pub parity_profile: ParityProfile,
}

impl CivilTimeRequest {
    /// Parse the datetime string and validate coordinates.
    pub fn parse(
        local_datetime: &str,
        latitude: f64,
        longitude: f64,
        parity_profile: ParityProfile,
    ) -> Result<Self, ResolveError> {
        validate_coordinates(latitude, longitude)?;
        let local_datetime = janma_time::parse_local_datetime(local_datetime)?;
        Ok(Self {
            local_datetime,
            latitude,
            longitude,
            parity_profile,
        })
    }

    pub fn validate(&self) -> Result<(), ResolveError> {
        validate_coordinates(self.latitude, self.longitude)
    }
}

/// Reject out-of-range coordinates. Values are never clamped.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), ResolveError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(ResolveError::InvalidInput(format!(
            "latitude {latitude} outside [-90, 90]"
        )));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(ResolveError::InvalidInput(format!(
            "longitude {longitude} outside [-180, 180]"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionMode {
    #[serde(rename = "nominal")]
    Nominal,
    #[serde(rename = "patched")]
    Patched,
    #[serde(rename = "ambiguous-fallback")]
    AmbiguousFallback,
}

impl ResolutionMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nominal => "nominal",
            Self::Patched => "patched",
            Self::AmbiguousFallback => "ambiguous-fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Ids of the patches that shaped the result, in application order.
    pub patches_applied: Vec<String>,
    pub resolution_mode: ResolutionMode,
}

/// An unambiguous instant with an audit trail of how it was reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTime {
    pub utc: DateTime<Utc>,
    pub zone_id: String,
    /// Offset east of UTC that was applied, seconds.
    pub offset_seconds: i32,
    pub dst_active: bool,
    pub confidence: f64,
    pub reason: String,
    pub provenance: Provenance,
}

/// `UTC-05:00`, `UTC+04:51`, `UTC+05:53:28`.
pub fn format_offset(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let abs = seconds.unsigned_abs();
    let (h, m, s) = (abs / 3600, (abs % 3600) / 60, abs % 60);
    if s == 0 {
        format!("UTC{sign}{h:02}:{m:02}")
    } else {
        format!("UTC{sign}{h:02}:{m:02}:{s:02}")
    }
}
