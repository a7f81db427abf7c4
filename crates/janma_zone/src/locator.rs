//! Nominal time-zone lookup from coordinates.
//!
//! The resolver only needs "which IANA zone governs this point"; the rules
//! of that zone come from chrono-tz. Points outside every land zone use
//! the nautical zone for their longitude.

use std::fmt::{self, Debug};
use std::sync::{Arc, OnceLock};

use chrono_tz::Tz;
use tracing::warn;
use tzf_rs::DefaultFinder;

/// How a zone was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    /// The point lies inside a zone boundary.
    Boundary,
    /// Open sea: `Etc/GMT±N` from longitude.
    Nautical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneLookup {
    pub zone: Tz,
    pub source: LookupSource,
}

/// Coordinate → IANA zone.
pub trait ZoneLocator: Debug + Send + Sync {
    fn locate(&self, lat: f64, lon: f64) -> ZoneLookup;
}

/// Nautical zone for a longitude: 15° bands centred on multiples of 15°.
///
/// `Etc/GMT+N` means N hours *behind* UTC, so the sign is inverted.
pub fn nautical_zone(lon: f64) -> Tz {
    let hours = (lon / 15.0).round().clamp(-12.0, 12.0) as i32;
    let name = match hours {
        0 => "Etc/GMT".to_string(),
        h if h > 0 => format!("Etc/GMT-{h}"),
        h => format!("Etc/GMT+{}", -h),
    };
    name.parse().unwrap_or(Tz::UTC)
}

/// Zone lookup against the timezone-boundary-builder polygons bundled with
/// `tzf-rs`. Points the database reports as ocean get the nautical zone.
pub struct BoundaryLocator {
    finder: DefaultFinder,
}

impl BoundaryLocator {
    /// Builds the polygon index. Slow; prefer [`BoundaryLocator::shared`].
    pub fn new() -> Self {
        Self {
            finder: DefaultFinder::new(),
        }
    }

    /// Process-wide instance, built on first use.
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<BoundaryLocator>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(Self::new())).clone()
    }

    /// Raw database answer; empty or `Etc/...` over open ocean.
    pub fn zone_name(&self, lat: f64, lon: f64) -> &str {
        self.finder.get_tz_name(lon, lat)
    }
}

impl Default for BoundaryLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for BoundaryLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundaryLocator").finish_non_exhaustive()
    }
}

impl ZoneLocator for BoundaryLocator {
    fn locate(&self, lat: f64, lon: f64) -> ZoneLookup {
        let name = self.zone_name(lat, lon);
        let nautical = ZoneLookup {
            zone: nautical_zone(lon),
            source: LookupSource::Nautical,
        };
        if name.is_empty() || name.starts_with("Etc/") {
            return nautical;
        }
        match name.parse::<Tz>() {
            Ok(zone) => ZoneLookup {
                zone,
                source: LookupSource::Boundary,
            },
            Err(_) => {
                warn!(zone = name, lat, lon, "boundary zone missing from tzdb; using nautical zone");
                nautical
            }
        }
    }
}

/// Always answers with one zone. Useful for tests and single-zone services.
#[derive(Debug, Clone, Copy)]
pub struct FixedZoneLocator(pub Tz);

impl ZoneLocator for FixedZoneLocator {
    fn locate(&self, _lat: f64, _lon: f64) -> ZoneLookup {
        ZoneLookup {
            zone: self.0,
            source: LookupSource::Boundary,
        }
    }
}
