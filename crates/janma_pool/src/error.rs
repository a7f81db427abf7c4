//! Error types for the coordination layer.

use std::time::Duration;

use janma_ephem::EphemerisError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum PoolError {
    /// Every worker queue is full; the request was not enqueued.
    #[error("all {workers} worker queues are full")]
    Overloaded { workers: usize },
    /// No answer within the request deadline. Not retried.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// The backend failed, crashed or panicked; its worker recycles it.
    #[error("ephemeris backend unavailable: {0}")]
    BackendUnavailable(String),
    /// A request-level ephemeris error such as an uncovered instant.
    #[error(transparent)]
    Ephemeris(EphemerisError),
    #[error("worker pool is shut down")]
    ShutDown,
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("failed to start worker thread: {0}")]
    Spawn(String),
}

impl From<EphemerisError> for PoolError {
    fn from(e: EphemerisError) -> Self {
        if e.is_fatal() {
            Self::BackendUnavailable(e.to_string())
        } else {
            Self::Ephemeris(e)
        }
    }
}
