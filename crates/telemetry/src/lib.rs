//! Logging and tracing bootstrap.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use bookstall_kernel::settings::{LogFormat, TelemetrySettings};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the configured `log_level` directive.
/// Calling this twice is an error because only one global subscriber can exist.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = env_filter(settings)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder
            .json()
            .with_current_span(true)
            .flatten_event(true)
            .try_init(),
    };

    installed
        .map_err(|error| anyhow::anyhow!(error.to_string()))
        .context("failed to install tracing subscriber")?;

    tracing::info!(
        target: "bookstall-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );
    Ok(())
}

fn env_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.log_level)
            .with_context(|| format!("invalid log level directive '{}'", settings.log_level)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_directive_is_accepted() {
        let settings = TelemetrySettings {
            log_level: "bookstall_app=debug,tower_http=info".to_string(),
            ..TelemetrySettings::default()
        };

        assert!(env_filter(&settings).is_ok());
    }

    #[test]
    fn second_init_fails() {
        let settings = TelemetrySettings::default();

        // Another test may already own the global subscriber; either way the
        // second attempt below must fail.
        let _ = init(&settings);
        assert!(init(&settings).is_err());
    }
}
