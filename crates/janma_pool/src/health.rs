//! Aggregate health report.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::worker::WorkerStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
    Starting,
}

impl HealthStatus {
    /// Combine worker states and the timeout-rate flag.
    ///
    /// No worker up: `starting` while none has failed yet, else `unhealthy`.
    /// Any worker down or a high timeout rate: `degraded`.
    pub fn from_workers(statuses: &[WorkerStatus], timeouts_degraded: bool) -> Self {
        let up = statuses.iter().filter(|s| **s == WorkerStatus::Up).count();
        let down = statuses.iter().filter(|s| **s == WorkerStatus::Down).count();
        match (up, down) {
            (0, 0) => Self::Starting,
            (0, _) => Self::Unhealthy,
            (_, d) if d > 0 || timeouts_degraded => Self::Degraded,
            _ => Self::Healthy,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
            Self::Starting => "starting",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KernelHealth {
    pub bundle: &'static str,
    pub ok: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheHealth {
    pub entries: usize,
    pub hit_rate_percent: f64,
    pub hits: u64,
}

impl From<CacheStats> for CacheHealth {
    fn from(s: CacheStats) -> Self {
        Self {
            entries: s.entries,
            hit_rate_percent: s.hit_rate_percent,
            hits: s.hits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolStats {
    pub size: usize,
    pub queue_depth: usize,
    pub workers_up: usize,
    pub rejected: u64,
    /// Jobs dropped unexecuted because their caller had timed out.
    pub skipped: u64,
    pub recycles: u64,
    pub timeout_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EphemerisHealth {
    pub policy: &'static str,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub de440_range: Option<DateRange>,
}

/// Everything the coordination layer knows about its own health.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolHealth {
    pub status: HealthStatus,
    pub kernels: KernelHealth,
    pub cache: CacheHealth,
    pub pool: PoolStats,
    pub ephemeris: EphemerisHealth,
}
