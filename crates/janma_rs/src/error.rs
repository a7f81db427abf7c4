//! Service-level errors.
//!
//! Every failure that leaves [`ChartService`](crate::ChartService) is a
//! [`ServiceError`]: a machine-readable [`ErrorKind`] plus the underlying
//! message. Lower-layer errors convert with `?`.

use std::fmt::{Display, Formatter};

use janma_houses::HouseError;
use janma_pool::PoolError;
use janma_time::TimeError;
use janma_zone::ResolveError;
use serde::Serialize;

use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    PolarUndefined,
    UnresolvableTime,
    BackendUnavailable,
    Timeout,
    Overloaded,
    Internal,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::PolarUndefined => "polar_undefined",
            Self::UnresolvableTime => "unresolvable_time",
            Self::BackendUnavailable => "backend_unavailable",
            Self::Timeout => "timeout",
            Self::Overloaded => "overloaded",
            Self::Internal => "internal",
        }
    }

    /// The caller must change the request; retrying it unchanged is futile.
    pub const fn is_client_error(self) -> bool {
        matches!(self, Self::InvalidInput | Self::PolarUndefined)
    }

    /// HTTP status an outer transport should answer with.
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput | Self::PolarUndefined => 422,
            Self::BackendUnavailable | Self::Overloaded => 503,
            Self::Timeout => 504,
            Self::UnresolvableTime | Self::Internal => 500,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl From<ResolveError> for ServiceError {
    fn from(e: ResolveError) -> Self {
        let kind = match e {
            ResolveError::InvalidInput(_) => ErrorKind::InvalidInput,
            ResolveError::UnresolvableTime(_) => ErrorKind::UnresolvableTime,
            _ => ErrorKind::Internal,
        };
        Self::new(kind, e.to_string())
    }
}

impl From<HouseError> for ServiceError {
    fn from(e: HouseError) -> Self {
        let kind = match e {
            HouseError::PolarUndefined { .. } => ErrorKind::PolarUndefined,
            HouseError::InvalidSystem(_) | HouseError::InvalidInput(_) => ErrorKind::InvalidInput,
            _ => ErrorKind::Internal,
        };
        Self::new(kind, e.to_string())
    }
}

impl From<PoolError> for ServiceError {
    fn from(e: PoolError) -> Self {
        let kind = match &e {
            PoolError::Overloaded { .. } => ErrorKind::Overloaded,
            PoolError::Timeout(_) => ErrorKind::Timeout,
            PoolError::BackendUnavailable(_) | PoolError::ShutDown => {
                ErrorKind::BackendUnavailable
            }
            // An instant outside kernel coverage or an unsupported body.
            PoolError::Ephemeris(_) => ErrorKind::InvalidInput,
            _ => ErrorKind::Internal,
        };
        Self::new(kind, e.to_string())
    }
}

impl From<TimeError> for ServiceError {
    fn from(e: TimeError) -> Self {
        let kind = match e {
            TimeError::InvalidDatetime { .. } => ErrorKind::InvalidInput,
            _ => ErrorKind::Internal,
        };
        Self::new(kind, e.to_string())
    }
}

impl From<ConfigError> for ServiceError {
    fn from(e: ConfigError) -> Self {
        Self::internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn polar_is_a_client_error() {
        let e: ServiceError = HouseError::PolarUndefined {
            latitude: 70.0,
            limit: 66.56,
        }
        .into();
        assert_eq!(e.kind, ErrorKind::PolarUndefined);
        assert!(e.kind.is_client_error());
        assert_eq!(e.kind.http_status(), 422);
        assert!(e.message.contains("Placidus"));
    }

    #[test]
    fn pool_errors_are_server_errors() {
        let e: ServiceError = PoolError::Timeout(Duration::from_millis(5)).into();
        assert_eq!((e.kind, e.kind.http_status()), (ErrorKind::Timeout, 504));
        let e: ServiceError = PoolError::Overloaded { workers: 2 }.into();
        assert_eq!(e.kind.http_status(), 503);
        let e: ServiceError = PoolError::BackendUnavailable("gone".into()).into();
        assert_eq!(e.kind, ErrorKind::BackendUnavailable);
        assert!(!e.kind.is_client_error());
    }

    #[test]
    fn resolve_errors_keep_their_kind() {
        let e: ServiceError = ResolveError::InvalidInput("latitude 91".into()).into();
        assert_eq!(e.kind, ErrorKind::InvalidInput);
        let e: ServiceError = ResolveError::ZoneData("bad".into()).into();
        assert_eq!(e.kind, ErrorKind::Internal);
    }

    #[test]
    fn serializes_kind_and_message() {
        let e = ServiceError::invalid_input("elevation 20000 m outside [-500, 10000]");
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["kind"], "invalid_input");
        assert!(v["message"].as_str().unwrap().contains("elevation"));
    }
}
