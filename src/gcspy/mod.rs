/*!
 * Heap Telemetry
 * Per-tile statistics for managed spaces, streamed to a visualisation client
 *
 * Each managed space owns one driver. At the start of a collection pass the
 * driver is reset, every live object is recorded, and at pass end the tiles
 * are sent as an ordered sequence of frames if a monitor is attached.
 */

mod accumulator;
mod driver;
mod interpreter;
mod plan;
mod protocol;
mod space;
mod stream;
mod subspace;
mod tile;
mod transport;
mod treadmill;

pub use accumulator::{AccountingStats, TileAccumulator};
pub use driver::{DriverDiagnostics, DriverState, SpaceDriver, TransmissionOutcome};
pub use interpreter::{GcEvent, MonitorLink, ServerInterpreter};
pub use plan::GcSpyPlan;
pub use protocol::{Frame, Section, SpaceMetadata};
pub use space::{ServerSpace, Transmission};
pub use stream::{Color, MetricStream, PaintStyle, Presentation, ValueKind};
pub use subspace::Subspace;
pub use tile::{control, TileStatistics};
pub use transport::{ChannelTransport, FrameReader, FramedWriter, JsonLinesWriter, Transport};
pub use treadmill::{TreadmillDriver, TreadmillParams, TREADMILL_DRIVER_NAME};
