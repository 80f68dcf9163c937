/*!
 * Space Drivers
 * Polymorphic interface implemented once per space kind
 */

use super::accumulator::{AccountingStats, TileAccumulator};
use super::interpreter::MonitorLink;
use super::space::ServerSpace;
use super::subspace::Subspace;
use super::transport::Transport;
use crate::core::errors::SpyError;
use crate::core::types::{Address, EventId, Size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-pass driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverState {
    /// Counters zeroed, nothing recorded yet
    Idle,
    /// At least one object recorded this pass
    Accumulating,
    /// Pass ended and the monitor was sent (or offered) the data
    ReadyToSend,
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverState::Idle => write!(f, "IDLE"),
            DriverState::Accumulating => write!(f, "ACCUMULATING"),
            DriverState::ReadyToSend => write!(f, "READY_TO_SEND"),
        }
    }
}

/// Result of offering a pass to the monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransmissionOutcome {
    /// No monitor wanted this event; nothing was computed
    Skipped,
    /// Every section was written
    Sent { frames: usize },
    /// A write failed; the remainder of this pass's transmission was dropped
    Aborted { frames_sent: usize, error: SpyError },
}

impl TransmissionOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, TransmissionOutcome::Sent { .. })
    }
}

/// Cumulative driver diagnostics, kept across passes
///
/// Skipped transmissions are not counted here: an unattached monitor must
/// leave the driver untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverDiagnostics {
    pub passes: u64,
    pub transmissions_sent: u64,
    pub transmissions_aborted: u64,
    /// Values capped while being emitted
    pub emit_clamps: u64,
    /// Objects recorded after the pass was sent without an intervening reset
    pub late_records: u64,
    /// Times the tracked bounds grew
    pub resizes: u64,
    /// Passes whose required tile count exceeded the tile array
    pub capped_passes: u64,
    /// Accounting anomalies recorded by the tile accumulator
    pub accounting: AccountingStats,
}

/// Telemetry driver for one managed space
///
/// One implementation per space kind. All methods take `&mut self`: a driver
/// has exactly one writer, the collector thread running the pass.
pub trait SpaceDriver: Send {
    /// Driver (space kind) name
    fn name(&self) -> &str;

    fn state(&self) -> DriverState;

    fn server_space(&self) -> &ServerSpace;

    fn subspace(&self) -> &Subspace;

    /// Tiles and totals of the current pass
    fn accumulator(&self) -> &TileAccumulator;

    fn diagnostics(&self) -> DriverDiagnostics;

    /// True if `addr` lies in the region this driver reports on
    fn covers(&self, addr: Address) -> bool;

    /// Zero tile counters and totals at the start of a pass
    fn reset(&mut self);

    /// Record one live object
    fn record_object(&mut self, addr: Address, size: Size);

    /// Fold a tracing worker's partial accumulator into this pass
    fn merge(&mut self, partial: &TileAccumulator);

    /// End the pass and transmit if `monitor` is connected for `event`
    ///
    /// Never fails: transport errors abort the transmission, not the pass.
    fn finish(
        &mut self,
        monitor: &dyn MonitorLink,
        event: EventId,
        transport: &mut dyn Transport,
    ) -> TransmissionOutcome;
}
