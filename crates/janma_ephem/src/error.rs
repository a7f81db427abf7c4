//! Error types for ephemeris access.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::body::Body;

/// Errors from an ephemeris backend or the client wrapping it.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum EphemerisError {
    /// The backend could not be created (missing kernel, bad context).
    #[error("backend initialization failed: {0}")]
    InitFailed(String),
    /// The backend failed mid-call; the instance must not be reused.
    #[error("backend crashed: {0}")]
    BackendCrashed(String),
    /// The backend returned coordinates outside their domain.
    #[error("backend returned invalid output: {0}")]
    InvalidOutput(String),
    /// The instant is outside the selected kernel's coverage.
    #[error("{utc} outside {bundle} coverage")]
    OutOfRange { utc: DateTime<Utc>, bundle: &'static str },
    #[error("body {0:?} not supported by this backend")]
    UnsupportedBody(Body),
}

impl EphemerisError {
    /// Whether the backend instance that produced this error is unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InitFailed(_) | Self::BackendCrashed(_) | Self::InvalidOutput(_)
        )
    }
}
