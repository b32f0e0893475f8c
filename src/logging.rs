//! Tracing subscriber setup
//!
//! Logs go to stderr so streamed progress and the report on stdout stay
//! clean. `RUST_LOG` takes precedence over the configured level.

use crate::config::LoggingConfig;
use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Level used when `--verbose` is passed
pub const VERBOSE_LEVEL: &str = "debug";

/// Filter directive for the given settings, before `RUST_LOG` is applied
#[must_use]
pub fn default_directive(config: &LoggingConfig, verbose: bool) -> String {
    let level = if verbose {
        VERBOSE_LEVEL
    } else {
        config.level.as_str()
    };
    format!("tripscout={level},warn")
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config, verbose)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_overrides_level() {
        let config = LoggingConfig::default();
        assert_eq!(default_directive(&config, false), "tripscout=info,warn");
        assert_eq!(default_directive(&config, true), "tripscout=debug,warn");
    }

    #[test]
    fn test_directive_parses() {
        let config = LoggingConfig {
            level: "trace".to_string(),
            ..LoggingConfig::default()
        };
        assert!(EnvFilter::try_new(default_directive(&config, false)).is_ok());
    }
}
