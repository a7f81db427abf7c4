//! Civil-time resolution with auditable provenance.
//!
//! Turns a naive local birth reading plus coordinates into a UTC instant:
//! - [`BoundaryLocator`] finds the nominal IANA zone (nautical fallback at sea)
//! - [`PatchDatabase`] holds documented historical deviations and profile tables
//! - [`TimeResolver`] combines the two and scores the result
//!
//! ```rust,ignore
//! use janma_zone::{ParityProfile, TimeResolver};
//!
//! let resolver = TimeResolver::builtin()?;
//! let r = resolver.resolve_str("1962-07-02T23:33:00", 37.840347, -85.949127,
//!     ParityProfile::StrictHistory)?;
//! assert_eq!(r.offset_seconds, -5 * 3600);
//! ```

pub mod db;
pub mod error;
pub mod locator;
pub mod patch;
pub mod profile;
pub mod region;
pub mod resolver;
pub mod types;

pub use db::{PatchDatabase, PatchQuery, PatchSelection};
pub use error::ResolveError;
pub use locator::{
    BoundaryLocator, FixedZoneLocator, LookupSource, ZoneLocator, ZoneLookup, nautical_zone,
};
pub use patch::{EvidenceGrade, PatchCategory, PatchDst, PatchOffset, ZonePatch};
pub use profile::{OverlapChoice, ParityProfile, ProfileRules, TieBreak};
pub use region::Region;
pub use resolver::{MAX_PATCH_PASSES, TimeResolver};
pub use types::{
    CivilTimeRequest, Provenance, ResolutionMode, ResolvedTime, format_offset,
    validate_coordinates,
};

/// IANA tz database release compiled into chrono-tz.
pub const TZDB_VERSION: &str = chrono_tz::IANA_TZDB_VERSION;
