//! Chart service facade.
//!
//! Ties the time resolver, the ephemeris worker pool and the house solver
//! together behind [`ChartService`], with TOML configuration and logging
//! setup for whoever hosts it.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use janma_rs::{ChartService, HousesRequest, ServiceConfig};
//!
//! let service = ChartService::start(ServiceConfig::load(path)?, factory)?;
//! let houses = service.houses(&HousesRequest {
//!     birth_time: "1962-07-02T23:33:00".into(),
//!     latitude: 37.840347,
//!     longitude: -85.949127,
//!     ..request
//! }).await?;
//! println!("ASC {:.4}", houses.houses.asc);
//! ```

pub mod config;
pub mod contracts;
pub mod error;
pub mod logging;
pub mod service;

pub use config::{
    ConfigError, EphemerisConfig, LoggingConfig, ServiceConfig, TimeConfig,
};
pub use contracts::{
    BirthTime, BodyEntry, HealthResponse, HousesEnvelope, HousesRequest, HousesResponse,
    Metadata, PositionsRequest, PositionsResponse, ResolveRequest, TimeHealth,
};
pub use error::{ErrorKind, ServiceError};
pub use logging::init_logger;
pub use service::ChartService;

// Re-exported so hosts need not depend on the lower crates directly.
pub use janma_ephem::{BackendFactory, Body, EphemerisPolicy};
pub use janma_houses::{Ayanamsa, HouseSystem, MCHemisphere};
pub use janma_zone::{ParityProfile, ResolvedTime};

pub const SERVICE_NAME: &str = "janma";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
