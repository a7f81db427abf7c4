//! Coordination layer between requests and the ephemeris backend.
//!
//! - [`WorkerPool`]: fixed OS-thread workers, each owning one backend
//!   instance behind a bounded queue; least-loaded dispatch, immediate
//!   rejection when saturated, per-request deadlines, panic recycling
//! - [`SnapshotCache`]: granularity-rounded snapshot cache with LRU
//!   eviction and single-flight initialisation
//! - [`TimeoutTracker`] and [`PoolHealth`]: aggregate health

pub mod cache;
pub mod config;
pub mod error;
pub mod health;
pub mod pool;
pub mod tracker;
pub mod worker;

pub use cache::{CacheKey, CacheStats, SnapshotCache};
pub use config::{CacheConfig, HealthConfig, PoolConfig};
pub use error::PoolError;
pub use health::{
    CacheHealth, DateRange, EphemerisHealth, HealthStatus, KernelHealth, PoolHealth, PoolStats,
};
pub use pool::WorkerPool;
pub use tracker::TimeoutTracker;
pub use worker::{WorkerState, WorkerStatus};
