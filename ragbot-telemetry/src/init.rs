use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },
}

/// Install a human-readable subscriber filtered by `RUST_LOG` (default `info`).
///
/// Calling this more than once is harmless: the first subscriber stays in
/// place. An unparsable `RUST_LOG` falls back to `info`, so this always
/// returns `Ok`; the `Result` matches [`init_with_filter`].
pub fn init_telemetry(service_name: &str) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let installed = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init();
    report_installed(service_name, installed.is_ok());
    Ok(())
}

/// Install a human-readable subscriber with an explicit filter directive such
/// as `"ragbot_rag=debug,info"`.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] if `filter` does not parse.
pub fn init_with_filter(filter: &str) -> Result<(), TelemetryError> {
    let env_filter = parse_filter(filter)?;
    let installed =
        tracing_subscriber::fmt().with_env_filter(env_filter).with_target(true).try_init();
    if installed.is_err() {
        tracing::debug!(filter, "subscriber already installed, filter not applied");
    }
    Ok(())
}

/// Install a JSON-lines subscriber filtered by `RUST_LOG` (default `info`).
///
/// Like [`init_telemetry`], this always returns `Ok`.
pub fn init_json(service_name: &str) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let installed = tracing_subscriber::fmt().json().with_env_filter(filter).try_init();
    report_installed(service_name, installed.is_ok());
    Ok(())
}

fn report_installed(service_name: &str, installed: bool) {
    if installed {
        tracing::info!(service.name = service_name, "telemetry initialized");
    } else {
        tracing::debug!(service.name = service_name, "subscriber already installed");
    }
}

fn parse_filter(filter: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(filter).map_err(|e| TelemetryError::InvalidFilter {
        filter: filter.to_string(),
        message: e.to_string(),
    })
}
