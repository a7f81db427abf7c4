//! The chart service: time resolution, cached ephemeris snapshots and
//! house computation behind one handle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use janma_ephem::{BackendFactory, BodySet};
use janma_frames::{mean_obliquity_deg, normalize_deg};
use janma_houses::{
    Ayanamsa, HOUSE_FRAME, HouseError, HouseInputs, HouseSystem, MCHemisphere, compute,
    polar_limit_deg,
};
use janma_pool::WorkerPool;
use janma_time::{EopKernel, Ut1Source, datetime_to_jd, jd_to_centuries, ut1_jd};
use janma_zone::{
    BoundaryLocator, CivilTimeRequest, ParityProfile, PatchDatabase, ResolvedTime, TZDB_VERSION,
    TimeResolver, validate_coordinates,
};
use tracing::{debug, info};

use crate::config::ServiceConfig;
use crate::contracts::{
    BirthTime, BodyEntry, COORDINATE_SYSTEM, ECLIPTIC_MODEL, HealthResponse, HousesEnvelope,
    HousesRequest, HousesResponse, Metadata, PositionsRequest, PositionsResponse, ResolveRequest,
    TimeHealth, validate_elevation,
};
use crate::error::ServiceError;
use crate::{SERVICE_NAME, VERSION};

/// Shared service state. Cheap to put behind an `Arc`; every method takes
/// `&self`.
#[derive(Debug)]
pub struct ChartService {
    config: ServiceConfig,
    resolver: TimeResolver,
    eop: Option<EopKernel>,
    pool: WorkerPool,
}

/// Instant plus the resolution record when one was needed.
struct Placed {
    utc: DateTime<Utc>,
    resolved: Option<ResolvedTime>,
}

struct HouseOutcome {
    houses: HousesResponse,
    ut1_source: Ut1Source,
}

/// Rejects polar Placidus from the mean obliquity before any pool work.
/// The solver repeats the check against the backend's obliquity.
fn check_polar_placidus(
    utc: DateTime<Utc>,
    latitude: f64,
    system: HouseSystem,
) -> Result<(), ServiceError> {
    if system != HouseSystem::Placidus {
        return Ok(());
    }
    let limit = polar_limit_deg(mean_obliquity_deg(jd_to_centuries(datetime_to_jd(utc))));
    if latitude.abs() >= limit {
        return Err(HouseError::PolarUndefined { latitude, limit }.into());
    }
    Ok(())
}

impl ChartService {
    /// Validate `config`, load zone and EOP data, and start the worker pool.
    pub fn start(
        config: ServiceConfig,
        factory: Arc<dyn BackendFactory>,
    ) -> Result<Self, ServiceError> {
        config.validate()?;

        let patches = match &config.time.patches_path {
            Some(path) => PatchDatabase::load(path)?,
            None => PatchDatabase::builtin()?,
        };
        let resolver = TimeResolver::new(Arc::new(patches), BoundaryLocator::shared());

        let eop = match &config.time.eop_path {
            Some(path) => {
                let kernel = EopKernel::load(path)?;
                info!(path = %path.display(), rows = kernel.data().len(), "loaded EOP table");
                Some(kernel)
            }
            None => None,
        };

        let pool = WorkerPool::start(
            factory,
            config.ephemeris.policy,
            &config.pool,
            &config.cache,
            &config.health,
        )?;

        info!(
            patches = resolver.patches().len(),
            tzdb = TZDB_VERSION,
            workers = pool.size(),
            policy = config.ephemeris.policy.as_str(),
            "chart service started"
        );
        Ok(Self {
            config,
            resolver,
            eop,
            pool,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn resolver(&self) -> &TimeResolver {
        &self.resolver
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    fn profile(&self, requested: Option<ParityProfile>) -> ParityProfile {
        requested.unwrap_or(self.config.time.parity_profile_default)
    }

    /// Local birth reading to UTC with provenance.
    pub fn resolve(&self, request: &ResolveRequest) -> Result<ResolvedTime, ServiceError> {
        let civil = CivilTimeRequest::parse(
            &request.local_datetime,
            request.latitude,
            request.longitude,
            self.profile(request.parity_profile),
        )?;
        Ok(self.resolver.resolve(&civil)?)
    }

    fn place(
        &self,
        birth_time: &str,
        latitude: f64,
        longitude: f64,
        elevation: f64,
        profile: Option<ParityProfile>,
    ) -> Result<Placed, ServiceError> {
        validate_coordinates(latitude, longitude)?;
        validate_elevation(elevation)?;
        match BirthTime::parse(birth_time)? {
            BirthTime::Utc(utc) => Ok(Placed {
                utc,
                resolved: None,
            }),
            BirthTime::Local(local_datetime) => {
                let resolved = self.resolver.resolve(&CivilTimeRequest {
                    local_datetime,
                    latitude,
                    longitude,
                    parity_profile: self.profile(profile),
                })?;
                Ok(Placed {
                    utc: resolved.utc,
                    resolved: Some(resolved),
                })
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn houses_at(
        &self,
        utc: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
        obliquity_deg: f64,
        system: HouseSystem,
        mc_hemisphere: MCHemisphere,
        ayanamsa: Ayanamsa,
    ) -> Result<HouseOutcome, ServiceError> {
        let (jd_ut1, ut1_source) = ut1_jd(utc, self.eop.as_ref());
        let inputs = HouseInputs::at(jd_ut1, latitude, longitude, obliquity_deg);
        let result = compute(&inputs, system, mc_hemisphere)?
            .to_sidereal(ayanamsa.deg_at_jd(datetime_to_jd(utc)))?;
        Ok(HouseOutcome {
            houses: HousesResponse {
                system,
                frame: HOUSE_FRAME,
                coordinate_system: COORDINATE_SYSTEM,
                ecliptic_model: ECLIPTIC_MODEL,
                ayanamsa,
                mc_hemisphere: mc_hemisphere.resolve(latitude),
                asc: result.ascendant,
                mc: result.midheaven,
                cusps: result.cusps,
                local_sidereal_time_deg: inputs.local_sidereal_time_deg,
            },
            ut1_source,
        })
    }

    /// Body positions, plus houses when the request names a system.
    pub async fn positions(
        &self,
        request: &PositionsRequest,
    ) -> Result<PositionsResponse, ServiceError> {
        let placed = self.place(
            &request.birth_time,
            request.latitude,
            request.longitude,
            request.elevation,
            request.parity_profile,
        )?;
        let bodies = request.body_set();
        if bodies.is_empty() {
            return Err(ServiceError::invalid_input("no bodies requested"));
        }
        if let Some(system) = request.system {
            check_polar_placidus(placed.utc, request.latitude, system)?;
        }
        debug!(utc = %placed.utc, bodies = bodies.len(), "positions");

        let snapshot = self.pool.snapshot(placed.utc, bodies).await?;
        let ayanamsa_deg = request.ayanamsa.deg_at_jd(datetime_to_jd(placed.utc));
        let entries = snapshot
            .positions
            .iter()
            .map(|p| BodyEntry {
                body: p.body,
                longitude: normalize_deg(p.longitude - ayanamsa_deg),
                latitude: p.latitude,
                distance: p.distance,
            })
            .collect();

        let (houses, ut1_source) = match request.system {
            Some(system) => {
                let outcome = self.houses_at(
                    placed.utc,
                    request.latitude,
                    request.longitude,
                    snapshot.obliquity_deg,
                    system,
                    request.mc_hemisphere,
                    request.ayanamsa,
                )?;
                (Some(outcome.houses), outcome.ut1_source)
            }
            None => (None, ut1_jd(placed.utc, self.eop.as_ref()).1),
        };

        Ok(PositionsResponse {
            utc: placed.utc,
            resolved: placed.resolved,
            bodies: entries,
            houses,
            metadata: Metadata::new(
                snapshot.obliquity_deg,
                request.ayanamsa,
                ayanamsa_deg,
                snapshot.bundle.name(),
                ut1_source,
                request.elevation,
            ),
        })
    }

    /// Ascendant, midheaven and cusps. The obliquity comes from the
    /// backend through the snapshot cache.
    pub async fn houses(&self, request: &HousesRequest) -> Result<HousesEnvelope, ServiceError> {
        let placed = self.place(
            &request.birth_time,
            request.latitude,
            request.longitude,
            request.elevation,
            request.parity_profile,
        )?;
        check_polar_placidus(placed.utc, request.latitude, request.system)?;
        debug!(utc = %placed.utc, system = request.system.as_str(), "houses");

        let snapshot = self.pool.snapshot(placed.utc, BodySet::empty()).await?;
        let outcome = self.houses_at(
            placed.utc,
            request.latitude,
            request.longitude,
            snapshot.obliquity_deg,
            request.system,
            request.mc_hemisphere,
            request.ayanamsa,
        )?;
        let ayanamsa_deg = request.ayanamsa.deg_at_jd(datetime_to_jd(placed.utc));

        Ok(HousesEnvelope {
            utc: placed.utc,
            resolved: placed.resolved,
            houses: outcome.houses,
            metadata: Metadata::new(
                snapshot.obliquity_deg,
                request.ayanamsa,
                ayanamsa_deg,
                snapshot.bundle.name(),
                outcome.ut1_source,
                request.elevation,
            ),
        })
    }

    /// Aggregate health. Reads counters only; never waits on a worker.
    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            pool: self.pool.health(),
            time: TimeHealth {
                tzdb_version: TZDB_VERSION,
                parity_profile_default: self.config.time.parity_profile_default,
                patches: self.resolver.patches().len(),
            },
            service: SERVICE_NAME,
            version: VERSION,
        }
    }

    /// Stop the workers after their queued jobs. Blocks.
    pub fn shutdown(self) {
        info!("chart service shutting down");
        self.pool.shutdown();
    }
}
