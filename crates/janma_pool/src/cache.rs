//! Snapshot cache in front of the workers.
//!
//! Keys round the instant to the configured granularity, so every request
//! in one bucket shares the snapshot computed at the bucket's instant. Each
//! key owns a [`OnceCell`]: concurrent requests for a missing key wait on
//! one initialisation instead of computing it twice.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use janma_ephem::{BodySet, EphemerisSnapshot, Frame};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::OnceCell;

use crate::config::CacheConfig;

/// Cache key: rounded instant, body set and frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    bucket: i64,
    granularity_ms: u64,
    pub bodies: BodySet,
    pub frame: Frame,
}

impl CacheKey {
    pub fn new(utc: DateTime<Utc>, bodies: BodySet, frame: Frame, granularity_ms: u64) -> Self {
        let g = granularity_ms.max(1) as i64;
        let ms = utc.timestamp_millis();
        // Round half up to the nearest bucket.
        let bucket = (ms + g / 2).div_euclid(g);
        Self {
            bucket,
            granularity_ms: g as u64,
            bodies,
            frame,
        }
    }

    /// The instant every request in this bucket is computed at.
    pub fn instant(&self) -> DateTime<Utc> {
        let ms = self.bucket.saturating_mul(self.granularity_ms as i64);
        DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

type Slot = Arc<OnceCell<Arc<EphemerisSnapshot>>>;

#[derive(Debug)]
struct Entry {
    slot: Slot,
    inserted: Instant,
    last_used: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<CacheKey, Entry>,
    tick: u64,
}

/// Cache counters as reported by health.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate_percent: f64,
}

#[derive(Debug)]
pub struct SnapshotCache {
    capacity: usize,
    granularity_ms: u64,
    ttl: Option<Duration>,
    inner: Mutex<Inner>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SnapshotCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            capacity: config.capacity.max(1),
            granularity_ms: config.granularity_ms.max(1),
            ttl: config.ttl(),
            inner: Mutex::new(Inner::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn key(&self, utc: DateTime<Utc>, bodies: BodySet, frame: Frame) -> CacheKey {
        CacheKey::new(utc, bodies, frame, self.granularity_ms)
    }

    /// Return the cached snapshot for `key` or build it with `init`.
    ///
    /// Only the caller whose `init` runs counts a miss; callers that find
    /// the value, or wait for another caller's `init`, count a hit. A failed
    /// `init` leaves the key empty for the next caller.
    pub async fn get_or_try_insert<E, F, Fut>(
        &self,
        key: CacheKey,
        init: F,
    ) -> Result<Arc<EphemerisSnapshot>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<EphemerisSnapshot>, E>>,
    {
        let slot = self.slot(key);
        if let Some(found) = slot.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(found));
        }
        let mut ran = false;
        let result = slot
            .get_or_try_init(|| {
                ran = true;
                init()
            })
            .await
            .map(Arc::clone);
        if ran {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else if result.is_ok() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    fn slot(&self, key: CacheKey) -> Slot {
        let mut inner = self.inner.lock();
        inner.tick += 1;
        let tick = inner.tick;
        let expired = match (self.ttl, inner.entries.get(&key)) {
            (Some(ttl), Some(entry)) => entry.inserted.elapsed() > ttl,
            _ => false,
        };
        if expired {
            inner.entries.remove(&key);
        }
        if let Some(entry) = inner.entries.get_mut(&key) {
            entry.last_used = tick;
            return Arc::clone(&entry.slot);
        }
        while inner.entries.len() >= self.capacity {
            if !evict_lru(&mut inner.entries) {
                break;
            }
        }
        let slot: Slot = Arc::new(OnceCell::new());
        inner.entries.insert(
            key,
            Entry {
                slot: Arc::clone(&slot),
                inserted: Instant::now(),
                last_used: tick,
            },
        );
        slot
    }

    /// Number of filled entries.
    pub fn entries(&self) -> usize {
        self.inner
            .lock()
            .entries
            .values()
            .filter(|e| e.slot.initialized())
            .count()
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStats {
            entries: self.entries(),
            hits,
            misses,
            hit_rate_percent: if total == 0 {
                0.0
            } else {
                hits as f64 * 100.0 / total as f64
            },
        }
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }
}

/// Drops the least recently used entry that no caller is initialising.
/// An empty slot still shared outside the map has an `init` in flight;
/// evicting it would let a second caller start another one.
fn evict_lru(entries: &mut HashMap<CacheKey, Entry>) -> bool {
    // Linear scan; capacities are a few thousand entries.
    let oldest = entries
        .iter()
        .filter(|(_, e)| e.slot.initialized() || Arc::strong_count(&e.slot) == 1)
        .min_by_key(|(_, e)| e.last_used)
        .map(|(k, _)| *k);
    match oldest {
        Some(key) => entries.remove(&key).is_some(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use janma_ephem::{Body, KernelBundle};

    fn snapshot(utc: DateTime<Utc>) -> Arc<EphemerisSnapshot> {
        Arc::new(EphemerisSnapshot {
            utc,
            frame: Frame::EclipticOfDate,
            bundle: KernelBundle::De440,
            obliquity_deg: 23.44,
            positions: Vec::new(),
        })
    }

    fn cache(capacity: usize) -> SnapshotCache {
        SnapshotCache::new(&CacheConfig {
            capacity,
            granularity_ms: 1_000,
            ttl_secs: 0,
        })
    }

    fn sun() -> BodySet {
        [Body::Sun].into_iter().collect()
    }

    #[test]
    fn keys_round_to_granularity() {
        let t = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 10).unwrap();
        let a = CacheKey::new(t, sun(), Frame::EclipticOfDate, 1_000);
        let b = CacheKey::new(
            t + chrono::Duration::milliseconds(400),
            sun(),
            Frame::EclipticOfDate,
            1_000,
        );
        let c = CacheKey::new(
            t + chrono::Duration::milliseconds(600),
            sun(),
            Frame::EclipticOfDate,
            1_000,
        );
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.instant(), t);
        assert_eq!(c.instant(), t + chrono::Duration::seconds(1));
    }

    #[test]
    fn negative_instants_round_consistently() {
        let t = Utc.with_ymd_and_hms(1943, 5, 1, 12, 0, 0).unwrap();
        let k = CacheKey::new(t - chrono::Duration::milliseconds(300), sun(), Frame::EclipticOfDate, 1_000);
        assert_eq!(k.instant(), t);
    }

    #[tokio::test]
    async fn second_lookup_is_a_hit() {
        let c = cache(8);
        let t = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let key = c.key(t, sun(), Frame::EclipticOfDate);
        let mut runs = 0;
        for _ in 0..2 {
            c.get_or_try_insert::<(), _, _>(key, || {
                runs += 1;
                async move { Ok(snapshot(t)) }
            })
            .await
            .unwrap();
        }
        assert_eq!(runs, 1);
        let s = c.stats();
        assert_eq!((s.hits, s.misses, s.entries), (1, 1, 1));
        assert_eq!(s.hit_rate_percent, 50.0);
    }

    #[tokio::test]
    async fn failed_init_leaves_key_empty() {
        let c = cache(8);
        let t = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let key = c.key(t, sun(), Frame::EclipticOfDate);
        let r = c
            .get_or_try_insert(key, || async { Err::<Arc<EphemerisSnapshot>, _>("down") })
            .await;
        assert!(r.is_err());
        assert_eq!(c.entries(), 0);
        c.get_or_try_insert::<&str, _, _>(key, || async move { Ok(snapshot(t)) })
            .await
            .unwrap();
        assert_eq!(c.entries(), 1);
        assert_eq!(c.stats().misses, 2);
    }

    #[tokio::test]
    async fn least_recently_used_is_evicted() {
        let c = cache(2);
        let base = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let keys: Vec<CacheKey> = (0..3)
            .map(|i| c.key(base + chrono::Duration::seconds(i), sun(), Frame::EclipticOfDate))
            .collect();
        for key in &keys[..2] {
            let t = key.instant();
            c.get_or_try_insert::<(), _, _>(*key, || async move { Ok(snapshot(t)) })
                .await
                .unwrap();
        }
        // Touch the first so the second becomes least recently used.
        let t0 = keys[0].instant();
        c.get_or_try_insert::<(), _, _>(keys[0], || async move { Ok(snapshot(t0)) })
            .await
            .unwrap();
        let t2 = keys[2].instant();
        c.get_or_try_insert::<(), _, _>(keys[2], || async move { Ok(snapshot(t2)) })
            .await
            .unwrap();

        assert_eq!(c.entries(), 2);
        let inner = c.inner.lock();
        assert!(inner.entries.contains_key(&keys[0]));
        assert!(!inner.entries.contains_key(&keys[1]));
    }

    #[tokio::test]
    async fn initialising_slot_survives_eviction() {
        let c = Arc::new(cache(1));
        let base = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let slow = c.key(base, sun(), Frame::EclipticOfDate);
        let other = c.key(base + chrono::Duration::seconds(5), sun(), Frame::EclipticOfDate);

        let (release, gate) = tokio::sync::oneshot::channel::<()>();
        let first = tokio::spawn({
            let c = Arc::clone(&c);
            async move {
                c.get_or_try_insert::<(), _, _>(slow, || async move {
                    let _ = gate.await;
                    Ok(snapshot(base))
                })
                .await
            }
        });
        // Let the first caller start its init.
        while !c.inner.lock().entries.contains_key(&slow) {
            tokio::task::yield_now().await;
        }

        // At capacity: the idle key may go, the initialising one may not.
        c.get_or_try_insert::<(), _, _>(other, || async move { Ok(snapshot(base)) })
            .await
            .unwrap();
        assert!(c.inner.lock().entries.contains_key(&slow));

        let reruns = Arc::new(AtomicU64::new(0));
        let second = tokio::spawn({
            let c = Arc::clone(&c);
            let reruns = Arc::clone(&reruns);
            async move {
                c.get_or_try_insert::<(), _, _>(slow, || async move {
                    reruns.fetch_add(1, Ordering::SeqCst);
                    Ok(snapshot(base))
                })
                .await
            }
        });
        tokio::task::yield_now().await;
        let _ = release.send(());
        let a = first.await.unwrap().unwrap();
        let b = second.await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(reruns.load(Ordering::SeqCst), 0);
        assert_eq!(c.stats().misses, 2);
    }

    #[test]
    fn idle_empty_slot_is_evictable() {
        let c = cache(1);
        let base = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let a = c.key(base, sun(), Frame::EclipticOfDate);
        let b = c.key(base + chrono::Duration::seconds(5), sun(), Frame::EclipticOfDate);
        drop(c.slot(a));
        drop(c.slot(b));
        let inner = c.inner.lock();
        assert_eq!(inner.entries.len(), 1);
        assert!(inner.entries.contains_key(&b));
    }
}
