//! Error types for the house solver.

use thiserror::Error;

/// Errors from house-cusp computation.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum HouseError {
    /// Placidus has no solution: part of the ecliptic never rises or sets.
    #[error(
        "Placidus houses are undefined at latitude {latitude}°: beyond ±{limit:.4}° the ecliptic has circumpolar points"
    )]
    PolarUndefined { latitude: f64, limit: f64 },
    #[error("unknown house system '{0}'")]
    InvalidSystem(String),
    #[error("invalid house input: {0}")]
    InvalidInput(&'static str),
    /// The semi-arc relation for an intermediate cusp did not converge.
    #[error("Placidus cusp {cusp} did not converge")]
    NonConvergent { cusp: u8 },
    /// A computed result broke a geometric invariant; never a caller error.
    #[error("house invariant violated: {0}")]
    InvariantViolated(String),
}
