//! Pool behaviour against the fixture backend.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use janma_ephem::{Body, BodySet, EphemerisPolicy, FixtureFactory};
use janma_pool::{CacheConfig, HealthConfig, HealthStatus, PoolConfig, PoolError, WorkerPool};

fn birth() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1962, 7, 3, 4, 33, 0).unwrap()
}

fn bodies() -> BodySet {
    [Body::Sun, Body::Moon, Body::Mars].into_iter().collect()
}

fn start(factory: &FixtureFactory, workers: usize, queue: usize, timeout_ms: u64) -> Arc<WorkerPool> {
    let pool = WorkerPool::start(
        Arc::new(factory.clone()),
        EphemerisPolicy::Auto,
        &PoolConfig {
            workers,
            queue_capacity: queue,
            request_timeout_ms: timeout_ms,
        },
        &CacheConfig::default(),
        &HealthConfig {
            timeout_window: 10,
            degraded_timeout_ratio: 0.2,
        },
    )
    .unwrap();
    Arc::new(pool)
}

async fn settle(pool: &WorkerPool) -> HealthStatus {
    for _ in 0..200 {
        let status = pool.health().status;
        if status != HealthStatus::Starting {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    pool.health().status
}

#[tokio::test]
async fn repeated_query_hits_cache_once() {
    let factory = FixtureFactory::new();
    let pool = start(&factory, 2, 8, 2_000);

    let first = pool.snapshot(birth(), bodies()).await.unwrap();
    assert_eq!(factory.calls(), 3);
    let rate_after_first = pool.cache_stats().hit_rate_percent;

    let again = pool
        .snapshot(birth() + chrono::Duration::milliseconds(200), bodies())
        .await
        .unwrap();
    assert_eq!(factory.calls(), 3, "second query must not reach the backend");
    assert!(Arc::ptr_eq(&first, &again));

    let stats = pool.cache_stats();
    assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    assert!(stats.hit_rate_percent > rate_after_first);

    let mut last = stats.hit_rate_percent;
    for _ in 0..5 {
        pool.snapshot(birth(), bodies()).await.unwrap();
        let rate = pool.cache_stats().hit_rate_percent;
        assert!(rate >= last);
        last = rate;
    }
}

#[tokio::test]
async fn concurrent_misses_compute_once() {
    let factory = FixtureFactory::new().with_delay(Duration::from_millis(20));
    let pool = start(&factory, 4, 16, 5_000);

    let handles: Vec<_> = (0..12)
        .map(|_| {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move { pool.snapshot(birth(), bodies()).await })
        })
        .collect();
    for h in handles {
        h.await.unwrap().unwrap();
    }
    assert_eq!(factory.calls(), 3);
    let stats = pool.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 11);
}

#[tokio::test]
async fn saturated_queues_reject_immediately() {
    let factory = FixtureFactory::new().with_delay(Duration::from_millis(300));
    let pool = start(&factory, 1, 1, 5_000);
    assert_eq!(settle(&pool).await, HealthStatus::Healthy);

    let running = {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move { pool.submit(|c| c.position(Body::Sun, birth())).await })
    };
    tokio::time::sleep(Duration::from_millis(80)).await;
    let queued = {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move { pool.submit(|c| c.position(Body::Moon, birth())).await })
    };
    tokio::time::sleep(Duration::from_millis(40)).await;

    let rejected = pool.submit(|c| c.position(Body::Mars, birth())).await;
    assert!(matches!(rejected, Err(PoolError::Overloaded { workers: 1 })));
    assert_eq!(pool.health().pool.rejected, 1);

    running.await.unwrap().unwrap();
    queued.await.unwrap().unwrap();
}

#[tokio::test]
async fn timed_out_jobs_are_skipped_not_retried() {
    let factory = FixtureFactory::new().with_delay(Duration::from_millis(200));
    let pool = start(&factory, 1, 4, 50);
    assert_eq!(settle(&pool).await, HealthStatus::Healthy);

    let a = {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move { pool.submit(|c| c.position(Body::Sun, birth())).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    let b = pool.submit(|c| c.position(Body::Moon, birth())).await;
    assert!(matches!(b, Err(PoolError::Timeout(_))));
    assert!(matches!(a.await.unwrap(), Err(PoolError::Timeout(_))));

    // Let the running call finish and the abandoned one be dequeued.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(factory.calls(), 1);
    let health = pool.health();
    assert_eq!(health.pool.skipped, 1);
    assert_eq!(health.pool.queue_depth, 0);
    assert!(health.pool.timeout_ratio > 0.0);
}

#[tokio::test]
async fn sustained_timeouts_degrade_health() {
    let factory = FixtureFactory::new().with_delay(Duration::from_millis(60));
    let pool = start(&factory, 1, 8, 20);
    assert_eq!(settle(&pool).await, HealthStatus::Healthy);

    for _ in 0..5 {
        let r = pool.submit(|c| c.position(Body::Sun, birth())).await;
        assert!(matches!(r, Err(PoolError::Timeout(_))));
    }
    assert_eq!(pool.health().status, HealthStatus::Degraded);
}

#[tokio::test]
async fn crashed_backend_is_recycled() {
    let factory = FixtureFactory::new().with_crash_on_call(1);
    let pool = start(&factory, 1, 4, 2_000);
    settle(&pool).await;

    let r = pool.submit(|c| c.position(Body::Sun, birth())).await;
    assert!(matches!(r, Err(PoolError::BackendUnavailable(_))));

    pool.submit(|c| c.position(Body::Sun, birth())).await.unwrap();
    assert_eq!(factory.creations(), 2);
    assert_eq!(pool.health().pool.recycles, 1);
    assert_eq!(pool.health().status, HealthStatus::Healthy);
}

#[tokio::test]
async fn panicking_backend_does_not_kill_the_worker() {
    let factory = FixtureFactory::new().with_panic_on_call(1);
    let pool = start(&factory, 1, 4, 2_000);
    settle(&pool).await;

    let r = pool.submit(|c| c.position(Body::Sun, birth())).await;
    assert!(matches!(r, Err(PoolError::BackendUnavailable(_))));

    let p = pool.submit(|c| c.position(Body::Sun, birth())).await.unwrap();
    assert_eq!(p.body, Body::Sun);
    assert_eq!(factory.creations(), 2);
}

#[tokio::test]
async fn failing_backend_is_unhealthy_not_fatal() {
    let factory = FixtureFactory::new().with_init_failures(u64::MAX);
    let pool = start(&factory, 2, 4, 2_000);
    assert_eq!(settle(&pool).await, HealthStatus::Unhealthy);

    let r = pool.snapshot(birth(), bodies()).await;
    assert!(matches!(r, Err(PoolError::BackendUnavailable(_))));
    let health = pool.health();
    assert!(!health.kernels.ok);
    assert_eq!(health.cache.entries, 0);
}

#[tokio::test]
async fn out_of_range_is_a_request_error() {
    let factory = FixtureFactory::new();
    let pool = WorkerPool::start(
        Arc::new(factory.clone()),
        EphemerisPolicy::De440,
        &PoolConfig::default(),
        &CacheConfig::default(),
        &HealthConfig::default(),
    )
    .unwrap();
    let t = Utc.with_ymd_and_hms(1200, 1, 1, 0, 0, 0).unwrap();
    let r = pool.snapshot(t, bodies()).await;
    assert!(matches!(r, Err(PoolError::Ephemeris(_))));
    assert_eq!(settle(&pool).await, HealthStatus::Healthy);
}

#[tokio::test]
async fn health_report_shape() {
    let factory = FixtureFactory::new();
    let pool = start(&factory, 3, 4, 1_000);
    assert_eq!(settle(&pool).await, HealthStatus::Healthy);

    let v = serde_json::to_value(pool.health()).unwrap();
    assert_eq!(v["status"], "healthy");
    assert_eq!(v["kernels"]["bundle"], "de440");
    assert_eq!(v["kernels"]["ok"], true);
    assert_eq!(v["pool"]["size"], 3);
    assert_eq!(v["pool"]["queue_depth"], 0);
    assert_eq!(v["ephemeris"]["policy"], "auto");
    assert!(v["ephemeris"]["de440_range"]["start"].is_string());
    assert!(v["cache"]["hit_rate_percent"].is_number());
}

#[test]
fn invalid_config_is_rejected_before_spawning() {
    let factory = FixtureFactory::new();
    let r = WorkerPool::start(
        Arc::new(factory.clone()),
        EphemerisPolicy::Auto,
        &PoolConfig {
            workers: 0,
            ..PoolConfig::default()
        },
        &CacheConfig::default(),
        &HealthConfig::default(),
    );
    assert!(matches!(r, Err(PoolError::InvalidConfig(_))));
    assert_eq!(factory.creations(), 0);
}

#[test]
fn shutdown_joins_workers() {
    let factory = FixtureFactory::new();
    let pool = WorkerPool::start(
        Arc::new(factory.clone()),
        EphemerisPolicy::Auto,
        &PoolConfig::default(),
        &CacheConfig::default(),
        &HealthConfig::default(),
    )
    .unwrap();
    pool.shutdown();
    assert_eq!(factory.creations(), 2);
}
