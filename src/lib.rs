/*!
 * Heapspy
 * Tile-granular heap telemetry for a garbage collector's large object space
 */

pub mod config;
pub mod core;
pub mod gcspy;
pub mod memory;
pub mod monitoring;

// Re-exports
pub use config::SpyConfig;
pub use self::core::errors::{ConfigError, ProtocolError, SpyError, SpyResult, TransportError};
pub use gcspy::{
    ChannelTransport, Frame, FramedWriter, GcEvent, GcSpyPlan, JsonLinesWriter, MonitorLink,
    ServerInterpreter, SpaceDriver, TransmissionOutcome, Transport, TreadmillDriver,
    TreadmillParams,
};
pub use memory::{AllocationOracle, LargeObjectSpace, MemoryError, MemoryResult};
pub use monitoring::{init_tracing, MetricsCollector, MetricsSnapshot};
