//! Error types for time parsing and UT1 lookup.

use thiserror::Error;

/// Errors from civil-time parsing or EOP lookup.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum TimeError {
    /// A civil timestamp could not be parsed.
    #[error("invalid datetime '{input}': {reason}")]
    InvalidDatetime { input: String, reason: &'static str },
    /// IERS EOP file parsing failed.
    #[error("EOP parse error: {0}")]
    EopParse(String),
    /// Requested epoch is outside the EOP table range.
    #[error("epoch outside EOP table range")]
    EopOutOfRange,
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TimeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
