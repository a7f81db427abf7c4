//! The seam to the external ephemeris provider.
//!
//! A backend is an opaque, non-reentrant provider of body positions. Every
//! method takes `&mut self`, so safe code cannot call into one instance from
//! two places at once; the worker pool owns one instance per worker.

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use janma_frames::mean_obliquity_deg;
use janma_time::{datetime_to_jd, jd_to_centuries};

use crate::body::Body;
use crate::error::EphemerisError;
use crate::policy::KernelBundle;
use crate::position::BodyPosition;

/// One loaded ephemeris context.
pub trait EphemerisBackend: Send {
    /// Bundle this instance was created for.
    fn bundle(&self) -> KernelBundle;

    /// Geocentric ecliptic-of-date position of `body` at `utc`.
    fn position(&mut self, body: Body, utc: DateTime<Utc>) -> Result<BodyPosition, EphemerisError>;

    /// Mean obliquity of the ecliptic at `utc`, degrees.
    fn mean_obliquity_deg(&mut self, utc: DateTime<Utc>) -> Result<f64, EphemerisError> {
        Ok(iau2006_obliquity_deg(utc))
    }
}

/// Creates backend instances; shared by all workers.
pub trait BackendFactory: Debug + Send + Sync {
    /// Short label for logs and health output.
    fn name(&self) -> &str;

    fn create(&self, bundle: KernelBundle) -> Result<Box<dyn EphemerisBackend>, EphemerisError>;
}

/// IAU 2006 mean obliquity at a UTC instant (T taken from UTC; the TT − UTC
/// difference moves ε by well under a micro-arcsecond).
pub fn iau2006_obliquity_deg(utc: DateTime<Utc>) -> f64 {
    mean_obliquity_deg(jd_to_centuries(datetime_to_jd(utc)))
}
