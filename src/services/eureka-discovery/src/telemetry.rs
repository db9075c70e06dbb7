//! Telemetry setup

use crate::config::LoggingConfig;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing and logging.
///
/// Fails instead of panicking when a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = match config.format.as_str() {
        "json" => fmt::layer().json().boxed(),
        _ => fmt::layer().pretty().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_only_once() {
        let config = LoggingConfig {
            level: "eureka_discovery=debug".to_string(),
            format: "json".to_string(),
        };

        // A subscriber may already be installed by an earlier call in this process
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
