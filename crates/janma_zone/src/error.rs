//! Error types for civil-time resolution.

use thiserror::Error;

/// Errors from the resolver or from loading zone data.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// Malformed or out-of-range request field.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// No offset could be determined for the request.
    #[error("unresolvable time: {0}")]
    UnresolvableTime(String),
    /// Patch or region data failed to parse or validate.
    #[error("zone data error: {0}")]
    ZoneData(String),
    /// I/O error while reading a data file.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ResolveError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<toml::de::Error> for ResolveError {
    fn from(e: toml::de::Error) -> Self {
        Self::ZoneData(e.to_string())
    }
}

impl From<janma_time::TimeError> for ResolveError {
    fn from(e: janma_time::TimeError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}
