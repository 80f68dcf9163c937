/*!
 * Telemetry Plan
 * Pass lifecycle glue between the collector, the drivers and the monitor
 */

use super::accumulator::TileAccumulator;
use super::driver::{DriverDiagnostics, SpaceDriver, TransmissionOutcome};
use super::interpreter::{GcEvent, ServerInterpreter};
use super::subspace::Subspace;
use super::transport::Transport;
use crate::core::types::Address;
use crate::memory::AllocationOracle;
use crate::monitoring::{MetricsCollector, Timer};
use std::sync::Arc;
use tracing::{debug, info, span, warn, Level};

/// Owns the drivers for every monitored space and runs them through a pass
///
/// `Send`; hosts that trace in parallel either wrap the plan in a
/// `parking_lot::Mutex` or trace into [`TileAccumulator`] partials and merge
/// them with [`GcSpyPlan::merge_partial`].
pub struct GcSpyPlan<O: AllocationOracle> {
    oracle: O,
    interpreter: ServerInterpreter,
    drivers: Vec<Box<dyn SpaceDriver>>,
    /// Diagnostics captured at pass start, for per-pass deltas
    baseline: Vec<DriverDiagnostics>,
    transport: Box<dyn Transport>,
    metrics: Arc<MetricsCollector>,
    passes: u64,
    pass_timer: Option<Timer>,
}

impl<O: AllocationOracle> GcSpyPlan<O> {
    pub fn new(oracle: O, interpreter: ServerInterpreter, transport: Box<dyn Transport>) -> Self {
        Self::with_metrics(oracle, interpreter, transport, Arc::new(MetricsCollector::new()))
    }

    pub fn with_metrics(
        oracle: O,
        interpreter: ServerInterpreter,
        transport: Box<dyn Transport>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        info!(server = interpreter.name(), "Telemetry plan created");
        Self {
            oracle,
            interpreter,
            drivers: Vec::new(),
            baseline: Vec::new(),
            transport,
            metrics,
            passes: 0,
            pass_timer: None,
        }
    }

    /// Register a driver, returning its index
    pub fn add_driver(&mut self, driver: Box<dyn SpaceDriver>) -> usize {
        info!(
            driver = driver.name(),
            space_id = driver.server_space().id(),
            "Driver registered"
        );
        self.baseline.push(driver.diagnostics());
        self.drivers.push(driver);
        self.drivers.len() - 1
    }

    pub fn driver(&self, index: usize) -> Option<&dyn SpaceDriver> {
        self.drivers.get(index).map(|d| d.as_ref())
    }

    pub fn drivers(&self) -> impl Iterator<Item = &dyn SpaceDriver> {
        self.drivers.iter().map(|d| d.as_ref())
    }

    pub fn interpreter(&self) -> &ServerInterpreter {
        &self.interpreter
    }

    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Passes started so far
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Start a collection pass: every driver is reset
    pub fn on_pass_start(&mut self) {
        self.passes += 1;
        self.pass_timer = Some(Timer::new("gcspy.pass.duration", self.metrics.clone()));
        for (driver, baseline) in self.drivers.iter_mut().zip(self.baseline.iter_mut()) {
            driver.reset();
            *baseline = driver.diagnostics();
        }
        self.metrics.inc_counter("gcspy.passes", 1.0);
        debug!(pass = self.passes, drivers = self.drivers.len(), "Pass started");
    }

    /// Record one live object with the driver whose region holds it
    ///
    /// Objects are routed by space membership: an address outside every
    /// driver's `covers` range is counted under `gcspy.objects.untracked`
    /// and never reaches any driver's totals or high-water mark. Returns
    /// false in that case, or when the object's size is unknown.
    pub fn trace_object(&mut self, addr: Address) -> bool {
        let Some(driver) = self.drivers.iter_mut().find(|d| d.covers(addr)) else {
            self.metrics.inc_counter("gcspy.objects.untracked", 1.0);
            warn!(addr = format_args!("0x{:x}", addr), "No driver covers object");
            return false;
        };
        let Some(size) = self.oracle.allocation_size(addr) else {
            self.metrics.inc_counter("gcspy.objects.unknown_size", 1.0);
            warn!(addr = format_args!("0x{:x}", addr), "Allocation size unknown");
            return false;
        };
        driver.record_object(addr, size);
        true
    }

    /// An empty worker accumulator for driver `index`, with the tiling to record against
    pub fn partial(&self, index: usize) -> Option<(Subspace, TileAccumulator)> {
        let driver = self.drivers.get(index)?;
        Some((driver.subspace().clone(), driver.accumulator().partial()))
    }

    /// Fold a worker accumulator into driver `index`
    pub fn merge_partial(&mut self, index: usize, partial: &TileAccumulator) -> bool {
        match self.drivers.get_mut(index) {
            Some(driver) => {
                driver.merge(partial);
                true
            }
            None => false,
        }
    }

    /// End the pass and offer every driver's tiles to the monitor
    pub fn on_pass_end(&mut self) -> Vec<TransmissionOutcome> {
        let event = GcEvent::PassEnd.id();
        let mut outcomes = Vec::with_capacity(self.drivers.len());

        for (driver, baseline) in self.drivers.iter_mut().zip(self.baseline.iter()) {
            let outcome = driver.finish(&self.interpreter, event, self.transport.as_mut());
            match &outcome {
                TransmissionOutcome::Skipped => {
                    self.metrics.inc_counter("gcspy.transmissions.skipped", 1.0)
                }
                TransmissionOutcome::Sent { .. } => {
                    self.metrics.inc_counter("gcspy.transmissions.sent", 1.0)
                }
                TransmissionOutcome::Aborted { .. } => {
                    self.metrics.inc_counter("gcspy.transmissions.aborted", 1.0)
                }
            }

            let now = driver.diagnostics();
            let record_clamps = now.accounting.clamped_tiles - baseline.accounting.clamped_tiles;
            let out_of_range =
                now.accounting.out_of_range_tiles - baseline.accounting.out_of_range_tiles;
            let emit_clamps = now.emit_clamps - baseline.emit_clamps;
            if record_clamps > 0 {
                self.metrics.inc_counter("gcspy.clamps.record", record_clamps as f64);
            }
            if emit_clamps > 0 {
                self.metrics.inc_counter("gcspy.clamps.emit", emit_clamps as f64);
            }
            if out_of_range > 0 {
                self.metrics.inc_counter("gcspy.tiles.out_of_range", out_of_range as f64);
            }

            let id = driver.server_space().id();
            self.metrics.set_gauge(
                &format!("gcspy.space.{}.tiles", id),
                driver.subspace().tile_count() as f64,
            );
            self.metrics.set_gauge(
                &format!("gcspy.space.{}.used_bytes", id),
                driver.accumulator().total_used_bytes() as f64,
            );
            outcomes.push(outcome);
        }

        let duration = self.pass_timer.take().map(Timer::stop);
        debug!(pass = self.passes, ?duration, "Pass ended");
        outcomes
    }

    /// Run one whole pass over the given live objects
    pub fn collect<I>(&mut self, live: I) -> Vec<TransmissionOutcome>
    where
        I: IntoIterator<Item = Address>,
    {
        let span = span!(
            Level::DEBUG,
            "gc_pass",
            pass = self.passes + 1,
            objects = tracing::field::Empty,
        );
        let _entered = span.enter();

        self.on_pass_start();
        let mut objects = 0u64;
        for addr in live {
            if self.trace_object(addr) {
                objects += 1;
            }
        }
        span.record("objects", objects);
        self.on_pass_end()
    }
}
