/*!
 * Monitoring
 * Metrics and tracing setup for the telemetry layer itself
 */

mod metrics;
mod tracer;

pub use metrics::{HistogramStats, MetricsCollector, MetricsSnapshot, Timer};
pub use tracer::{init_tracing, init_tracing_with, TRACE_JSON_ENV};
