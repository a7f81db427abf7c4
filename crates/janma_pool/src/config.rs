//! Pool, cache and health settings.
//!
//! Each struct is one `[section]` of the service configuration file and
//! deserializes with defaults for missing fields.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PoolError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Worker threads; each owns one backend instance.
    pub workers: usize,
    /// Jobs each worker may hold queued.
    pub queue_capacity: usize,
    /// Wall-clock deadline per request, measured at submission.
    pub request_timeout_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 64,
            request_timeout_ms: 5_000,
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.workers == 0 {
            return Err(PoolError::InvalidConfig("pool.workers must be greater than zero"));
        }
        if self.queue_capacity == 0 {
            return Err(PoolError::InvalidConfig(
                "pool.queue_capacity must be greater than zero",
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(PoolError::InvalidConfig(
                "pool.request_timeout_ms must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Maximum snapshots kept; least recently used go first.
    pub capacity: usize,
    /// Instants within the same bucket share one snapshot.
    pub granularity_ms: u64,
    /// Maximum snapshot age in seconds; 0 keeps entries until evicted.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 4_096,
            granularity_ms: 1_000,
            ttl_secs: 0,
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.capacity == 0 {
            return Err(PoolError::InvalidConfig("cache.capacity must be greater than zero"));
        }
        if self.granularity_ms == 0 {
            return Err(PoolError::InvalidConfig(
                "cache.granularity_ms must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthConfig {
    /// Number of most recent request outcomes considered.
    pub timeout_window: usize,
    /// Share of timeouts in the window at which health turns degraded.
    pub degraded_timeout_ratio: f64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            timeout_window: 100,
            degraded_timeout_ratio: 0.2,
        }
    }
}

impl HealthConfig {
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.timeout_window == 0 {
            return Err(PoolError::InvalidConfig(
                "health.timeout_window must be greater than zero",
            ));
        }
        if !(self.degraded_timeout_ratio > 0.0 && self.degraded_timeout_ratio <= 1.0) {
            return Err(PoolError::InvalidConfig(
                "health.degraded_timeout_ratio must be within (0, 1]",
            ));
        }
        Ok(())
    }
}
