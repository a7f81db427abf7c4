//! The worker pool: submission, deadlines, cached snapshots and health.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use janma_ephem::{
    BackendFactory, BodySet, EphemerisClient, EphemerisError, EphemerisPolicy, EphemerisSnapshot,
    Frame,
};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::cache::{CacheStats, SnapshotCache};
use crate::config::{CacheConfig, HealthConfig, PoolConfig};
use crate::error::PoolError;
use crate::health::{
    DateRange, EphemerisHealth, HealthStatus, KernelHealth, PoolHealth, PoolStats,
};
use crate::tracker::TimeoutTracker;
use crate::worker::{self, BoxedJob, Task, WorkerHandle, WorkerStatus};

/// Fixed set of workers in front of one backend factory.
///
/// Callers never touch a backend: they submit closures that run on a
/// worker thread against that worker's [`EphemerisClient`].
#[derive(Debug)]
pub struct WorkerPool {
    workers: Vec<WorkerHandle>,
    cache: SnapshotCache,
    tracker: TimeoutTracker,
    request_timeout: Duration,
    policy: EphemerisPolicy,
    backend: String,
    rejected: AtomicU64,
}

impl WorkerPool {
    /// Validate the settings and start `pool.workers` threads.
    ///
    /// Workers warm up in the background; health reports `starting` until
    /// the first one finishes.
    pub fn start(
        factory: Arc<dyn BackendFactory>,
        policy: EphemerisPolicy,
        pool: &PoolConfig,
        cache: &CacheConfig,
        health: &HealthConfig,
    ) -> Result<Self, PoolError> {
        pool.validate()?;
        cache.validate()?;
        health.validate()?;

        let mut workers = Vec::with_capacity(pool.workers);
        for id in 0..pool.workers {
            let client = EphemerisClient::new(Arc::clone(&factory), policy);
            let handle = worker::spawn(id, client, pool.queue_capacity)
                .map_err(|e| PoolError::Spawn(e.to_string()))?;
            workers.push(handle);
        }
        info!(
            workers = pool.workers,
            queue_capacity = pool.queue_capacity,
            %policy,
            backend = factory.name(),
            "worker pool started"
        );

        Ok(Self {
            workers,
            cache: SnapshotCache::new(cache),
            tracker: TimeoutTracker::new(health.timeout_window, health.degraded_timeout_ratio),
            request_timeout: pool.request_timeout(),
            policy,
            backend: factory.name().to_string(),
            rejected: AtomicU64::new(0),
        })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    pub fn policy(&self) -> EphemerisPolicy {
        self.policy
    }

    /// Jobs queued across all workers.
    pub fn queue_depth(&self) -> usize {
        self.workers.iter().map(|w| w.state.queued()).sum()
    }

    pub fn worker_statuses(&self) -> Vec<WorkerStatus> {
        self.workers.iter().map(|w| w.state.status()).collect()
    }

    /// Run `f` on the least-loaded worker and await its answer.
    ///
    /// Rejected immediately with `Overloaded` when every queue is full.
    /// After the request deadline the caller gets `Timeout`; a job that has
    /// not started by then is skipped, one already running completes and
    /// its result is discarded.
    pub async fn submit<T, F>(&self, f: F) -> Result<T, PoolError>
    where
        T: Send + 'static,
        F: FnOnce(&mut EphemerisClient) -> Result<T, EphemerisError> + Send + 'static,
    {
        let (reply, rx) = oneshot::channel();
        let mut job: BoxedJob = Box::new(Task::new(f, reply));

        let mut order: Vec<&WorkerHandle> = self.workers.iter().collect();
        order.sort_by_key(|w| (w.state.queued(), w.id));

        let mut full = 0;
        let mut accepted = false;
        for w in order {
            w.state.queued.fetch_add(1, Ordering::AcqRel);
            match w.tx.try_send(job) {
                Ok(()) => {
                    accepted = true;
                    break;
                }
                Err(TrySendError::Full(back)) => {
                    w.state.queued.fetch_sub(1, Ordering::AcqRel);
                    full += 1;
                    job = back;
                }
                Err(TrySendError::Closed(back)) => {
                    w.state.queued.fetch_sub(1, Ordering::AcqRel);
                    job = back;
                }
            }
        }
        if !accepted {
            if full == 0 {
                return Err(PoolError::ShutDown);
            }
            self.rejected.fetch_add(1, Ordering::Relaxed);
            warn!(workers = self.workers.len(), "all worker queues full, rejecting");
            return Err(PoolError::Overloaded {
                workers: self.workers.len(),
            });
        }

        match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(result)) => {
                self.tracker.record(false);
                result.map_err(PoolError::from)
            }
            Ok(Err(_)) => {
                self.tracker.record(false);
                Err(PoolError::BackendUnavailable(
                    "worker dropped the request".to_string(),
                ))
            }
            Err(_) => {
                self.tracker.record(true);
                warn!(timeout_ms = self.request_timeout.as_millis() as u64, "request timed out");
                Err(PoolError::Timeout(self.request_timeout))
            }
        }
    }

    /// Positions of `bodies` and the obliquity at `utc`, through the cache.
    ///
    /// The snapshot is computed at the cache bucket's instant, so it may
    /// differ from `utc` by up to half the granularity.
    pub async fn snapshot(
        &self,
        utc: DateTime<Utc>,
        bodies: BodySet,
    ) -> Result<Arc<EphemerisSnapshot>, PoolError> {
        let key = self.cache.key(utc, bodies, Frame::EclipticOfDate);
        let at = key.instant();
        self.cache
            .get_or_try_insert(key, || async move {
                self.submit(move |client| client.snapshot(bodies, at))
                    .await
                    .map(Arc::new)
            })
            .await
    }

    /// Mean obliquity at `utc`, uncached.
    pub async fn mean_obliquity_deg(&self, utc: DateTime<Utc>) -> Result<f64, PoolError> {
        self.submit(move |client| client.mean_obliquity_deg(utc)).await
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Snapshot of pool, cache and backend health. Never blocks on workers.
    pub fn health(&self) -> PoolHealth {
        let statuses = self.worker_statuses();
        let workers_up = statuses.iter().filter(|s| **s == WorkerStatus::Up).count();
        let status = HealthStatus::from_workers(&statuses, self.tracker.is_degraded());
        PoolHealth {
            status,
            kernels: KernelHealth {
                bundle: self.policy.primary_bundle().name(),
                ok: workers_up > 0,
            },
            cache: self.cache.stats().into(),
            pool: PoolStats {
                size: self.workers.len(),
                queue_depth: self.queue_depth(),
                workers_up,
                rejected: self.rejected.load(Ordering::Relaxed),
                skipped: self.workers.iter().map(|w| w.state.skipped()).sum(),
                recycles: self.workers.iter().map(|w| w.state.recycles()).sum(),
                timeout_ratio: self.tracker.ratio(),
            },
            ephemeris: EphemerisHealth {
                policy: self.policy.as_str(),
                backend: self.backend.clone(),
                de440_range: self
                    .policy
                    .de440_range()
                    .map(|(start, end)| DateRange { start, end }),
            },
        }
    }

    /// Close every queue and wait for the threads to finish queued work.
    ///
    /// Blocks; call from synchronous code or `spawn_blocking`.
    pub fn shutdown(mut self) {
        for handle in self.workers.drain(..) {
            let WorkerHandle { id, tx, thread, .. } = handle;
            drop(tx);
            if let Some(thread) = thread {
                if thread.join().is_err() {
                    warn!(worker = id, "worker thread panicked during shutdown");
                }
            }
        }
    }
}
