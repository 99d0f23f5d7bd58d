//! Tracing subscriber bootstrap.

use bookstore_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::{fmt, EnvFilter};

/// Build the filter: `RUST_LOG` wins, otherwise the configured level.
pub fn env_filter(settings: &TelemetrySettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level))
}

/// Install the global tracing subscriber.
///
/// Calling this twice is harmless; the second installation is reported and
/// ignored.
pub fn init(settings: &TelemetrySettings) {
    let filter = env_filter(settings);

    let result = match settings.log_format {
        LogFormat::Pretty => fmt().with_env_filter(filter).try_init(),
        LogFormat::Json => fmt()
            .json()
            .with_current_span(true)
            .with_env_filter(filter)
            .try_init(),
    };

    match result {
        Ok(()) => tracing::info!(
            target: "bookstore-telemetry",
            format = ?settings.log_format,
            level = %settings.level,
            "tracing initialized"
        ),
        Err(err) => tracing::debug!(
            target: "bookstore-telemetry",
            error = %err,
            "tracing subscriber already installed"
        ),
    }
}
