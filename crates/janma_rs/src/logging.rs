//! Subscriber installation for binaries and services.
//!
//! Library crates only emit `tracing` events; whoever owns the process
//! calls [`init_logger`] once.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// `RUST_LOG` if set, else the configured directive.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter))
}

/// Install the global subscriber writing to stderr: compact text, or JSON
/// lines when `config.json` is set.
///
/// Returns `false` if a subscriber was already installed, which leaves the
/// existing one in place.
pub fn init_logger(config: &LoggingConfig) -> bool {
    let filter = env_filter(config);
    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    let installed = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .try_init()
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_refused() {
        let config = LoggingConfig::default();
        let _ = init_logger(&config);
        assert!(!init_logger(&config));
    }
}
