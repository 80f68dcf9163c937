/*!
 * Structured Tracing
 * Subscriber setup for the telemetry layer's tracing output
 *
 * Drivers and the plan log through the `tracing` macros; hosts that do not
 * install their own subscriber call [`init_tracing`] once at startup.
 */

use tracing::info;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Environment variable selecting JSON output
pub const TRACE_JSON_ENV: &str = "HEAPSPY_TRACE_JSON";

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - HEAPSPY_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() -> bool {
    let use_json = std::env::var(TRACE_JSON_ENV)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);
    init_tracing_with(use_json)
}

/// Install a subscriber with compact or JSON output
///
/// Returns false if a global subscriber was already installed.
pub fn init_tracing_with(use_json: bool) -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "Structured tracing initialized");
    }
    installed
}
