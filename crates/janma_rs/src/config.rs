//! Service configuration.
//!
//! ```toml
//! [pool]
//! workers = 4
//! queue_capacity = 64
//! request_timeout_ms = 5000
//!
//! [cache]
//! capacity = 4096
//! granularity_ms = 1000
//!
//! [time]
//! parity_profile_default = "strict_history"
//!
//! [ephemeris]
//! policy = "auto"
//!
//! [logging]
//! filter = "janma=info"
//! json = false
//! ```
//!
//! Every field has a default, so an empty file is a valid configuration.

use std::path::{Path, PathBuf};

use janma_ephem::EphemerisPolicy;
use janma_pool::{CacheConfig, HealthConfig, PoolConfig};
use janma_zone::{ParityProfile, TZDB_VERSION};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub pool: PoolConfig,
    pub cache: CacheConfig,
    pub health: HealthConfig,
    pub time: TimeConfig,
    pub ephemeris: EphemerisConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeConfig {
    /// Profile used when a request names none.
    pub parity_profile_default: ParityProfile,
    /// Expected tz database release; start-up fails if the compiled one differs.
    pub tzdb_version: Option<String>,
    /// Replacement zone-patch file.
    pub patches_path: Option<PathBuf>,
    /// IERS finals2000A file for UT1; UTC is used without it.
    pub eop_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EphemerisConfig {
    pub policy: EphemerisPolicy,
    /// Kernel directory for the host's backend factory; the service itself
    /// never reads it.
    pub kernel_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` overrides it.
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "janma=info".to_string(),
            json: false,
        }
    }
}

impl ServiceConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |e: janma_pool::PoolError| ConfigError::Invalid(e.to_string());
        self.pool.validate().map_err(invalid)?;
        self.cache.validate().map_err(invalid)?;
        self.health.validate().map_err(invalid)?;

        if let Some(pinned) = &self.time.tzdb_version {
            if pinned != TZDB_VERSION {
                return Err(ConfigError::Invalid(format!(
                    "time.tzdb_version pins {pinned} but {TZDB_VERSION} is compiled in"
                )));
            }
        }
        for (name, path) in [
            ("time.patches_path", &self.time.patches_path),
            ("time.eop_path", &self.time.eop_path),
            ("ephemeris.kernel_dir", &self.ephemeris.kernel_dir),
        ] {
            if path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
                return Err(ConfigError::Invalid(format!("{name} must not be empty")));
            }
        }
        EnvFilter::try_new(&self.logging.filter).map_err(|e| {
            ConfigError::Invalid(format!("logging.filter '{}': {e}", self.logging.filter))
        })?;
        Ok(())
    }
}
