//! Serialized-access wrapper around one worker's backend instances.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use crate::backend::{BackendFactory, EphemerisBackend};
use crate::body::{Body, BodySet};
use crate::error::EphemerisError;
use crate::policy::{EphemerisPolicy, KernelBundle};
use crate::position::{BodyPosition, EphemerisSnapshot, Frame};

/// Counters for one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClientStats {
    /// Calls that reached a backend instance.
    pub backend_calls: u64,
    /// Instances dropped after a fatal error.
    pub recycles: u64,
    pub init_failures: u64,
}

/// Owns at most one backend instance per kernel bundle.
///
/// Instances are created lazily and dropped after any fatal error; the next
/// call re-creates them. Nothing here is `Sync`-shared: a client belongs to
/// exactly one worker.
pub struct EphemerisClient {
    factory: Arc<dyn BackendFactory>,
    policy: EphemerisPolicy,
    backends: HashMap<KernelBundle, Box<dyn EphemerisBackend>>,
    stats: ClientStats,
}

impl std::fmt::Debug for EphemerisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EphemerisClient")
            .field("factory", &self.factory.name())
            .field("policy", &self.policy)
            .field("loaded", &self.backends.keys().collect::<Vec<_>>())
            .field("stats", &self.stats)
            .finish()
    }
}

impl EphemerisClient {
    pub fn new(factory: Arc<dyn BackendFactory>, policy: EphemerisPolicy) -> Self {
        Self {
            factory,
            policy,
            backends: HashMap::new(),
            stats: ClientStats::default(),
        }
    }

    pub fn policy(&self) -> EphemerisPolicy {
        self.policy
    }

    pub fn stats(&self) -> ClientStats {
        self.stats
    }

    pub fn is_loaded(&self, bundle: KernelBundle) -> bool {
        self.backends.contains_key(&bundle)
    }

    /// Load the policy's primary bundle so start-up failures surface early.
    pub fn warm_up(&mut self) -> Result<KernelBundle, EphemerisError> {
        let bundle = self.policy.primary_bundle();
        self.ensure_loaded(bundle)?;
        Ok(bundle)
    }

    /// Drop every instance; the next call re-creates from the factory.
    pub fn recycle(&mut self) {
        if !self.backends.is_empty() {
            self.stats.recycles += 1;
            self.backends.clear();
        }
    }

    pub fn position(&mut self, body: Body, utc: DateTime<Utc>) -> Result<BodyPosition, EphemerisError> {
        let bundle = self.policy.bundle_for(utc)?;
        self.call(bundle, |b| b.position(body, utc).and_then(checked))
    }

    pub fn mean_obliquity_deg(&mut self, utc: DateTime<Utc>) -> Result<f64, EphemerisError> {
        let bundle = self.policy.bundle_for(utc)?;
        self.call(bundle, |b| b.mean_obliquity_deg(utc))
    }

    /// Positions of every body in `bodies` plus the obliquity, from one bundle.
    pub fn snapshot(
        &mut self,
        bodies: BodySet,
        utc: DateTime<Utc>,
    ) -> Result<EphemerisSnapshot, EphemerisError> {
        let bundle = self.policy.bundle_for(utc)?;
        let positions = bodies
            .iter()
            .map(|body| self.call(bundle, |b| b.position(body, utc).and_then(checked)))
            .collect::<Result<Vec<_>, _>>()?;
        let obliquity_deg = self.call(bundle, |b| b.mean_obliquity_deg(utc))?;
        if !(obliquity_deg.is_finite() && (20.0..30.0).contains(&obliquity_deg)) {
            self.discard(bundle, "obliquity out of range");
            return Err(EphemerisError::InvalidOutput(format!(
                "obliquity {obliquity_deg}"
            )));
        }
        Ok(EphemerisSnapshot {
            utc,
            frame: Frame::EclipticOfDate,
            bundle,
            obliquity_deg,
            positions,
        })
    }

    fn ensure_loaded(&mut self, bundle: KernelBundle) -> Result<(), EphemerisError> {
        if self.backends.contains_key(&bundle) {
            return Ok(());
        }
        match self.factory.create(bundle) {
            Ok(backend) => {
                debug!(factory = self.factory.name(), %bundle, "backend created");
                self.backends.insert(bundle, backend);
                Ok(())
            }
            Err(e) => {
                self.stats.init_failures += 1;
                error!(factory = self.factory.name(), %bundle, error = %e, "backend init failed");
                Err(match e {
                    EphemerisError::InitFailed(_) => e,
                    other => EphemerisError::InitFailed(other.to_string()),
                })
            }
        }
    }

    fn call<T>(
        &mut self,
        bundle: KernelBundle,
        f: impl FnOnce(&mut dyn EphemerisBackend) -> Result<T, EphemerisError>,
    ) -> Result<T, EphemerisError> {
        self.ensure_loaded(bundle)?;
        let Some(backend) = self.backends.get_mut(&bundle) else {
            return Err(EphemerisError::InitFailed(format!("{bundle} not loaded")));
        };
        self.stats.backend_calls += 1;
        let result = f(backend.as_mut());
        if let Err(e) = &result {
            if e.is_fatal() {
                self.discard(bundle, &e.to_string());
            }
        }
        result
    }

    fn discard(&mut self, bundle: KernelBundle, why: &str) {
        if self.backends.remove(&bundle).is_some() {
            self.stats.recycles += 1;
            warn!(%bundle, reason = why, "backend instance discarded");
        }
    }
}

fn checked(position: BodyPosition) -> Result<BodyPosition, EphemerisError> {
    position.validate().map(|()| position)
}
