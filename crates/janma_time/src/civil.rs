//! Parsing of civil timestamps.
//!
//! A *local* datetime is a naive wall-clock reading with no offset; it only
//! becomes an instant once a zone has been resolved for it. A *UTC* instant
//! carries `Z` or an explicit offset.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::TimeError;

const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a naive local datetime such as `1962-07-02T23:33:00`.
///
/// Strings carrying an offset or `Z` are rejected: a local reading with an
/// offset is already an instant and must go through [`parse_utc_instant`].
pub fn parse_local_datetime(input: &str) -> Result<NaiveDateTime, TimeError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(invalid(input, "empty datetime"));
    }
    if DateTime::parse_from_rfc3339(s).is_ok() {
        return Err(invalid(input, "local datetime must not carry an offset"));
    }
    LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| invalid(input, "expected YYYY-MM-DDTHH:MM[:SS]"))
}

/// Parse an RFC 3339 instant (`1970-01-01T00:00:00Z`, `...+05:30`).
pub fn parse_utc_instant(input: &str) -> Result<DateTime<Utc>, TimeError> {
    DateTime::parse_from_rfc3339(input.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| invalid(input, "expected RFC 3339 instant with offset"))
}

fn invalid(input: &str, reason: &'static str) -> TimeError {
    TimeError::InvalidDatetime {
        input: input.to_string(),
        reason,
    }
}
