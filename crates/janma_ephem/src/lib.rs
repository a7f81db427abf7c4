//! Ephemeris access for chart computation.
//!
//! The ephemeris itself is an external collaborator reached through
//! [`EphemerisBackend`]. This crate provides the body catalogue, the
//! position/snapshot types, kernel bundle policy, and [`EphemerisClient`],
//! which owns backend instances exclusively and recycles them after faults.

pub mod backend;
pub mod body;
pub mod client;
pub mod error;
#[cfg(any(test, feature = "fixture"))]
pub mod fixture;
pub mod policy;
pub mod position;

pub use backend::{BackendFactory, EphemerisBackend, iau2006_obliquity_deg};
pub use body::{Body, BodySet};
pub use client::{ClientStats, EphemerisClient};
pub use error::EphemerisError;
#[cfg(any(test, feature = "fixture"))]
pub use fixture::{FixtureBackend, FixtureFactory};
pub use policy::{EphemerisPolicy, KernelBundle};
pub use position::{BodyPosition, ECLIPTIC_FRAME, EphemerisSnapshot, Frame};
