/*!
 * Treadmill Driver
 * Tile telemetry for the large object (treadmill) space
 *
 * The space holds only whole superpages, so every tile in range is reported
 * as used; occupancy is conveyed by the used-space and object streams.
 */

use super::accumulator::TileAccumulator;
use super::driver::{DriverDiagnostics, DriverState, SpaceDriver, TransmissionOutcome};
use super::interpreter::MonitorLink;
use super::space::{ServerSpace, Transmission};
use super::stream::{Color, MetricStream, PaintStyle, Presentation, ValueKind};
use super::subspace::Subspace;
use super::tile::control;
use super::transport::Transport;
use crate::core::errors::{ConfigError, SpyError, SpyResult};
use crate::core::limits::{
    KB, LOS_OBJECTS_STREAM, LOS_USED_SPACE_STREAM, OBJECTS_SUMMARY_ITEMS, USED_SPACE_SUMMARY_ITEMS,
};
use crate::core::types::{Address, EventId, Size, SpaceId};
use tracing::{debug, info, warn};

/// Driver name shown by the monitor
pub const TREADMILL_DRIVER_NAME: &str = "Treadmill Space";

/// Sizing parameters fixed at runtime start
#[derive(Debug, Clone)]
pub struct TreadmillParams {
    pub server_name: String,
    pub tile_size: Size,
    pub start: Address,
    pub end: Address,
    /// Large object threshold; bounds the objects-per-tile stream
    pub threshold: Size,
    pub main_space: bool,
}

/// Telemetry driver for a treadmill space
#[derive(Debug)]
pub struct TreadmillDriver {
    space: ServerSpace,
    subspace: Subspace,
    used_space_stream: MetricStream,
    objects_stream: MetricStream,
    tiles: TileAccumulator,
    state: DriverState,
    diagnostics: DriverDiagnostics,
}

impl TreadmillDriver {
    /// Create a driver with a tile array sized for the whole `[start, end)` range
    pub fn new(params: TreadmillParams, space_id: SpaceId) -> Result<Self, ConfigError> {
        let TreadmillParams {
            server_name,
            tile_size,
            start,
            end,
            threshold,
            main_space,
        } = params;

        if tile_size == 0 {
            return Err(ConfigError::InvalidTileSize(tile_size));
        }
        if threshold == 0 {
            return Err(ConfigError::InvalidThreshold(threshold));
        }
        if end <= start {
            return Err(ConfigError::InvalidRange { start, end });
        }

        let max_tiles = Subspace::count_tiles(start, end, tile_size);
        let subspace = Subspace::new(start, start, 0, tile_size, 0);

        let space = ServerSpace::new(
            space_id,
            &server_name,
            TREADMILL_DRIVER_NAME,
            "Block ",
            &Self::block_info(tile_size),
            0,
            "UNUSED",
            main_space,
        );

        let used_space_stream =
            MetricStream::new(LOS_USED_SPACE_STREAM, ValueKind::Int, "Used Space stream")
                .with_range(0, tile_size as i64)
                .with_zero(0, 0)
                .with_labels("Space used: ", " bytes")
                .with_style(Presentation::Percent, PaintStyle::Zero)
                .with_color(Color::RED);

        let objects_stream = MetricStream::new(LOS_OBJECTS_STREAM, ValueKind::Short, "Objects stream")
            .with_range(0, (tile_size / threshold).max(1) as i64)
            .with_zero(0, 0)
            .with_labels("No. of objects = ", " objects")
            .with_style(Presentation::Plus, PaintStyle::Zero)
            .with_color(Color::GREEN);

        info!(
            server = %server_name,
            space_id,
            tile_size,
            max_tiles,
            start = format_args!("0x{:x}", start),
            end = format_args!("0x{:x}", end),
            "Treadmill driver initialized"
        );

        Ok(Self {
            space,
            subspace,
            used_space_stream,
            objects_stream,
            tiles: TileAccumulator::new(max_tiles, tile_size, start),
            state: DriverState::Idle,
            diagnostics: DriverDiagnostics::default(),
        })
    }

    fn block_info(tile_size: Size) -> String {
        if tile_size < KB {
            format!("Block Size: {} bytes\n", tile_size)
        } else {
            format!("Block Size: {} KB\n", tile_size / KB)
        }
    }

    pub fn used_space_stream(&self) -> &MetricStream {
        &self.used_space_stream
    }

    pub fn objects_stream(&self) -> &MetricStream {
        &self.objects_stream
    }

    /// Label tiles `from..to` with their address ranges
    fn set_tile_names(&mut self, from: usize, to: usize) {
        for i in from..to {
            if let Some((lo, hi)) = self.subspace.tile_bounds(i) {
                self.space.set_tile_name(i, lo, hi);
            }
        }
    }

    /// Grow the tracked bounds to cover the highest object seen
    ///
    /// Growth only; bounds never shrink while the space exists.
    fn update_bounds(&mut self) {
        let Some(highest) = self.tiles.highest_observed() else {
            return;
        };
        let Some(highest_index) = self.subspace.index_for_address(highest) else {
            return;
        };

        let current = self.subspace.tile_count();
        let first = self.subspace.first_index();
        let mut required = (highest_index - first + 1).max(current);

        let capacity = self.tiles.capacity();
        if required > capacity {
            self.diagnostics.capped_passes += 1;
            // The high-water mark never drops, so only the first capped pass is worth a warning
            if self.diagnostics.capped_passes == 1 {
                warn!(
                    required,
                    capacity,
                    highest = format_args!("0x{:x}", highest),
                    "High-water mark beyond tile array, capping tracked tiles"
                );
            } else {
                debug!(required, capacity, "Tracked tiles capped");
            }
            required = capacity.max(current);
        }

        let start = self.subspace.start();
        let end = start + required * self.subspace.tile_size();
        if required > current || end != self.subspace.end() {
            self.subspace.reset(start, end, first, required);
            self.space.resize(required);
            self.set_tile_names(current, required);
            self.diagnostics.resizes += 1;
            debug!(
                from = current,
                to = required,
                end = format_args!("0x{:x}", end),
                "Tracked subspace grown"
            );
        }
    }

    fn send(&mut self, event: EventId, transport: &mut dyn Transport) -> Result<usize, (usize, SpyError)> {
        let mut tx = self.space.start_comm(transport, event).map_err(|e| (0, e))?;

        let mut clamps = 0;
        let result = self.send_sections(&mut tx, &mut clamps);
        self.diagnostics.emit_clamps += clamps;
        if clamps > 0 {
            warn!(
                space_id = self.space.id(),
                clamps, "Tile values exceeded their stream maximum and were clamped"
            );
        }
        if let Err(e) = result {
            return Err((tx.frames_sent(), e));
        }

        let sent = tx.frames_sent();
        tx.end(self.subspace.byte_len() as u64).map_err(|e| (sent, e))
    }

    fn send_sections(&self, tx: &mut Transmission<'_>, clamps: &mut u64) -> SpyResult<()> {
        let num_tiles = self.subspace.tile_count();
        let first = self.subspace.first_index();
        let tiles = &self.tiles.tiles()[first..first + num_tiles];

        tx.describe(
            self.space
                .metadata(&[&self.used_space_stream, &self.objects_stream]),
        )?;

        // (1) Used space stream
        let used = &self.used_space_stream;
        used.begin_stream(tx, num_tiles)?;
        for tile in tiles {
            if used.emit_value(tx, tile.used_bytes as i64)? {
                *clamps += 1;
            }
        }
        used.end_stream(tx)?;
        used.begin_summary(tx, USED_SPACE_SUMMARY_ITEMS)?;
        used.emit_summary_value(tx, self.tiles.total_used_bytes() as i64)?;
        used.emit_summary_value(tx, self.subspace.byte_len() as i64)?;
        used.end_summary(tx)?;

        // (2) Objects stream
        let objects = &self.objects_stream;
        objects.begin_stream(tx, num_tiles)?;
        for tile in tiles {
            if objects.emit_value(tx, tile.objects as i64)? {
                *clamps += 1;
            }
        }
        objects.end_stream(tx)?;
        objects.begin_summary(tx, OBJECTS_SUMMARY_ITEMS)?;
        objects.emit_summary_value(tx, self.tiles.total_objects() as i64)?;
        objects.end_summary(tx)?;

        // (3) Control: the whole space is used
        tx.control(first, vec![control::USED; num_tiles])
    }
}

impl SpaceDriver for TreadmillDriver {
    fn name(&self) -> &str {
        self.space.driver_name()
    }

    fn state(&self) -> DriverState {
        self.state
    }

    fn server_space(&self) -> &ServerSpace {
        &self.space
    }

    fn subspace(&self) -> &Subspace {
        &self.subspace
    }

    fn accumulator(&self) -> &TileAccumulator {
        &self.tiles
    }

    fn diagnostics(&self) -> DriverDiagnostics {
        DriverDiagnostics {
            accounting: *self.tiles.stats(),
            ..self.diagnostics
        }
    }

    fn covers(&self, addr: Address) -> bool {
        let start = self.subspace.start();
        let limit = start + self.tiles.capacity() * self.subspace.tile_size();
        addr >= start && addr < limit
    }

    fn reset(&mut self) {
        self.tiles.reset();
        self.state = DriverState::Idle;
        self.diagnostics.passes += 1;
    }

    fn record_object(&mut self, addr: Address, size: Size) {
        match self.state {
            DriverState::Idle => self.state = DriverState::Accumulating,
            DriverState::Accumulating => {}
            DriverState::ReadyToSend => {
                self.diagnostics.late_records += 1;
                debug!(
                    addr = format_args!("0x{:x}", addr),
                    "Object recorded after pass end without reset"
                );
                self.state = DriverState::Accumulating;
            }
        }
        self.tiles.record(&self.subspace, addr, size);
    }

    fn merge(&mut self, partial: &TileAccumulator) {
        if partial.total_objects() > 0 && self.state == DriverState::Idle {
            self.state = DriverState::Accumulating;
        }
        self.tiles.merge(partial);
    }

    fn finish(
        &mut self,
        monitor: &dyn MonitorLink,
        event: EventId,
        transport: &mut dyn Transport,
    ) -> TransmissionOutcome {
        if !monitor.is_connected(event) {
            return TransmissionOutcome::Skipped;
        }

        self.update_bounds();
        self.state = DriverState::ReadyToSend;

        match self.send(event, transport) {
            Ok(frames) => {
                self.diagnostics.transmissions_sent += 1;
                debug!(
                    space_id = self.space.id(),
                    event,
                    frames,
                    tiles = self.subspace.tile_count(),
                    objects = self.tiles.total_objects(),
                    used_bytes = self.tiles.total_used_bytes(),
                    "Transmission complete"
                );
                TransmissionOutcome::Sent { frames }
            }
            Err((frames_sent, error)) => {
                self.diagnostics.transmissions_aborted += 1;
                warn!(
                    space_id = self.space.id(),
                    event,
                    frames_sent,
                    error = %error,
                    "Transmission aborted"
                );
                TransmissionOutcome::Aborted { frames_sent, error }
            }
        }
    }
}
