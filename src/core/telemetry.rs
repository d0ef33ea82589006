use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::Settings;

const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls"];

/// Filter used when `RUST_LOG` is unset: the configured level for this crate,
/// warnings only for the HTTP stack underneath it.
pub(crate) fn default_directives(level: &str) -> String {
    let level = match level.trim() {
        "" => "info",
        trimmed => trimmed,
    };
    let mut directives = vec!["warn".to_string(), format!("{CRATE_TARGET}={level}")];
    directives.extend(QUIET_TARGETS.iter().map(|target| format!("{target}=warn")));
    directives.join(",")
}

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let telemetry = settings.telemetry();
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(&telemetry.log_level))?,
    };

    let builder = fmt().with_env_filter(filter).with_target(true);

    if telemetry.json {
        builder
            .json()
            .with_current_span(false)
            .try_init()
            .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    } else {
        builder.compact().try_init().map_err(|err| anyhow::anyhow!(err.to_string()))?;
    }

    tracing::debug!(level = %telemetry.log_level, json = telemetry.json, "Tracing installed");
    Ok(())
}
