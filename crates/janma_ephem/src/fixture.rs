//! Deterministic stand-in backend for tests and demos.
//!
//! Longitudes advance at fixed mean rates from J2000 values; latitudes and
//! distances are smooth functions of longitude. The numbers have the right
//! shape and domains but are **not** ephemeris data.
//!
//! The factory shares counters with every instance it creates and can be
//! told to fail initialisation, crash, panic or stall on a chosen call.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use janma_frames::normalize_deg;
use janma_time::{J2000_JD, datetime_to_jd};

use crate::backend::{BackendFactory, EphemerisBackend};
use crate::body::Body;
use crate::error::EphemerisError;
use crate::policy::KernelBundle;
use crate::position::BodyPosition;

/// (L0 at J2000 in degrees, mean motion in degrees/day, inclination, mean distance AU).
const fn elements(body: Body) -> (f64, f64, f64, f64) {
    match body {
        Body::Sun => (280.46646, 0.985_647_36, 0.0, 1.0),
        Body::Moon => (218.3165, 13.176_396_48, 5.145, 0.002_57),
        Body::Mercury => (252.2509, 4.092_334_45, 7.0, 1.0),
        Body::Venus => (181.9798, 1.602_130_34, 3.39, 1.0),
        Body::Mars => (355.433, 0.524_020_68, 1.85, 1.52),
        Body::Jupiter => (34.3515, 0.083_085_29, 1.3, 5.2),
        Body::Saturn => (50.0774, 0.033_444_14, 2.49, 9.54),
        Body::Uranus => (314.055, 0.011_728_34, 0.77, 19.2),
        Body::Neptune => (304.349, 0.005_981_03, 1.77, 30.1),
        Body::Pluto => (238.929, 0.003_970_00, 17.14, 39.5),
    }
}

#[derive(Debug, Default)]
struct FixtureState {
    calls: AtomicU64,
    creations: AtomicU64,
    init_failures_left: AtomicU64,
    crash_on_call: AtomicU64,
    panic_on_call: AtomicU64,
    delay_ms: AtomicU64,
}

/// Factory for [`FixtureBackend`]s. Clones share counters and fault settings.
#[derive(Debug, Clone, Default)]
pub struct FixtureFactory {
    state: Arc<FixtureState>,
}

impl FixtureFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `n` `create` calls fail.
    pub fn with_init_failures(self, n: u64) -> Self {
        self.state.init_failures_left.store(n, Ordering::SeqCst);
        self
    }

    /// The `n`-th position call (1-based, across instances) reports a crash.
    pub fn with_crash_on_call(self, n: u64) -> Self {
        self.state.crash_on_call.store(n, Ordering::SeqCst);
        self
    }

    /// The `n`-th position call panics.
    pub fn with_panic_on_call(self, n: u64) -> Self {
        self.state.panic_on_call.store(n, Ordering::SeqCst);
        self
    }

    /// Every position call blocks for `delay`.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.set_delay(delay);
        self
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state
            .delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Position calls served so far.
    pub fn calls(&self) -> u64 {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Instances created so far.
    pub fn creations(&self) -> u64 {
        self.state.creations.load(Ordering::SeqCst)
    }
}

impl BackendFactory for FixtureFactory {
    fn name(&self) -> &str {
        "fixture"
    }

    fn create(&self, bundle: KernelBundle) -> Result<Box<dyn EphemerisBackend>, EphemerisError> {
        let left = self.state.init_failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.state.init_failures_left.store(left - 1, Ordering::SeqCst);
            return Err(EphemerisError::InitFailed(format!(
                "fixture refused to load {bundle}"
            )));
        }
        self.state.creations.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FixtureBackend {
            bundle,
            state: Arc::clone(&self.state),
        }))
    }
}

/// Mean-motion backend instance.
#[derive(Debug)]
pub struct FixtureBackend {
    bundle: KernelBundle,
    state: Arc<FixtureState>,
}

impl EphemerisBackend for FixtureBackend {
    fn bundle(&self) -> KernelBundle {
        self.bundle
    }

    fn position(&mut self, body: Body, utc: DateTime<Utc>) -> Result<BodyPosition, EphemerisError> {
        let n = self.state.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let delay = self.state.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }
        if self.state.panic_on_call.load(Ordering::SeqCst) == n {
            panic!("fixture backend panicked on call {n}");
        }
        if self.state.crash_on_call.load(Ordering::SeqCst) == n {
            return Err(EphemerisError::BackendCrashed(format!(
                "fixture crashed on call {n}"
            )));
        }

        let (l0, rate, incl, dist) = elements(body);
        let d = datetime_to_jd(utc) - J2000_JD;
        let longitude = normalize_deg(l0 + rate * d);
        let phase = longitude.to_radians();
        Ok(BodyPosition {
            body,
            longitude,
            latitude: incl * (phase * 0.5).sin(),
            distance: dist * (1.0 + 0.0167 * phase.cos()),
        })
    }
}
