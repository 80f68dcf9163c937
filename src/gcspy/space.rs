/*!
 * Server Space
 * Per-driver description of a visualised space and its transmissions
 */

use super::protocol::{Frame, Section, SpaceMetadata};
use super::stream::MetricStream;
use super::transport::Transport;
use crate::core::data_structures::InlineString;
use crate::core::errors::{ProtocolError, SpyResult};
use crate::core::types::{Address, EventId, SpaceId, StreamId, TileIndex};

/// What a monitor knows about one space
#[derive(Debug, Clone)]
pub struct ServerSpace {
    id: SpaceId,
    server_name: InlineString,
    driver_name: InlineString,
    title: InlineString,
    block_info: InlineString,
    unused_label: InlineString,
    main_space: bool,
    tile_names: Vec<InlineString>,
}

impl ServerSpace {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: SpaceId,
        server_name: &str,
        driver_name: &str,
        title: &str,
        block_info: &str,
        tile_count: usize,
        unused_label: &str,
        main_space: bool,
    ) -> Self {
        Self {
            id,
            server_name: server_name.into(),
            driver_name: driver_name.into(),
            title: title.into(),
            block_info: block_info.into(),
            unused_label: unused_label.into(),
            main_space,
            tile_names: vec![InlineString::default(); tile_count],
        }
    }

    #[inline]
    pub fn id(&self) -> SpaceId {
        self.id
    }

    #[inline]
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    #[inline]
    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }

    #[inline]
    pub fn block_info(&self) -> &str {
        &self.block_info
    }

    #[inline]
    pub fn is_main_space(&self) -> bool {
        self.main_space
    }

    #[inline]
    pub fn tile_count(&self) -> usize {
        self.tile_names.len()
    }

    /// Change the number of tiles; new tiles start unlabelled
    pub fn resize(&mut self, tile_count: usize) {
        self.tile_names.resize(tile_count, InlineString::default());
    }

    /// Label tile `index` with its address range
    pub fn set_tile_name(&mut self, index: TileIndex, start: Address, end: Address) {
        if let Some(name) = self.tile_names.get_mut(index) {
            *name = format!("0x{:x}-0x{:x}", start, end).into();
        }
    }

    pub fn tile_name(&self, index: TileIndex) -> Option<&str> {
        self.tile_names.get(index).map(|n| n.as_str())
    }

    /// Snapshot of the space description for the client
    pub fn metadata(&self, streams: &[&MetricStream]) -> SpaceMetadata {
        SpaceMetadata {
            space_id: self.id,
            server_name: self.server_name.clone(),
            driver_name: self.driver_name.clone(),
            title: self.title.clone(),
            block_info: self.block_info.clone(),
            tile_count: self.tile_count() as u32,
            unused_label: self.unused_label.clone(),
            main_space: self.main_space,
            tile_names: self.tile_names.clone(),
            streams: streams.iter().map(|s| (*s).clone()).collect(),
        }
    }

    /// Open a transmission for `event` over `transport`
    pub fn start_comm<'t>(
        &self,
        transport: &'t mut dyn Transport,
        event: EventId,
    ) -> SpyResult<Transmission<'t>> {
        let mut tx = Transmission {
            transport,
            phase: Phase::Opened,
            open: None,
            frames_sent: 0,
        };
        tx.send(Frame::Start {
            space_id: self.id,
            event,
            tile_count: self.tile_count() as u32,
        })?;
        Ok(tx)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Opened,
    Body,
    Controlled,
    Closed,
}

#[derive(Debug)]
struct OpenSection {
    section: Section,
    stream_id: StreamId,
    declared: usize,
    values: Vec<i64>,
}

/// One logical transmission for one space
///
/// Enforces `start -> metadata -> (stream | summary)* -> control -> end`.
/// Stream and summary values are buffered and sent as one frame when the
/// section closes.
pub struct Transmission<'t> {
    transport: &'t mut dyn Transport,
    phase: Phase,
    open: Option<OpenSection>,
    frames_sent: usize,
}

impl<'t> Transmission<'t> {
    #[inline]
    pub fn frames_sent(&self) -> usize {
        self.frames_sent
    }

    fn send(&mut self, frame: Frame) -> SpyResult<()> {
        self.transport.send(&frame)?;
        self.frames_sent += 1;
        Ok(())
    }

    fn out_of_order(expected: &str, found: Section) -> ProtocolError {
        ProtocolError::SectionOutOfOrder {
            expected: expected.into(),
            found: found.to_string().into(),
        }
    }

    /// Send the space description; must directly follow the start frame
    pub fn describe(&mut self, metadata: SpaceMetadata) -> SpyResult<()> {
        if self.phase != Phase::Opened {
            return Err(Self::out_of_order("start", Section::Metadata).into());
        }
        self.send(Frame::Metadata(metadata))?;
        self.phase = Phase::Body;
        Ok(())
    }

    fn begin(&mut self, section: Section, stream_id: StreamId, declared: usize) -> SpyResult<()> {
        if self.phase != Phase::Body || self.open.is_some() {
            return Err(Self::out_of_order("metadata or a closed section", section).into());
        }
        self.open = Some(OpenSection {
            section,
            stream_id,
            declared,
            values: Vec::with_capacity(declared),
        });
        Ok(())
    }

    fn close(&mut self, section: Section, stream_id: StreamId) -> SpyResult<Vec<i64>> {
        match self.open.take() {
            Some(open) if open.section == section && open.stream_id == stream_id => {
                if open.values.len() != open.declared {
                    return Err(ProtocolError::CountMismatch {
                        stream_id,
                        declared: open.declared,
                        emitted: open.values.len(),
                    }
                    .into());
                }
                Ok(open.values)
            }
            other => {
                self.open = other;
                Err(Self::out_of_order("an open section", section).into())
            }
        }
    }

    pub fn begin_stream(&mut self, stream_id: StreamId, tile_count: usize) -> SpyResult<()> {
        self.begin(Section::Stream, stream_id, tile_count)
    }

    pub fn begin_summary(&mut self, stream_id: StreamId, items: usize) -> SpyResult<()> {
        self.begin(Section::Summary, stream_id, items)
    }

    /// Append a value to the open stream or summary section
    pub fn push_value(&mut self, stream_id: StreamId, value: i64) -> SpyResult<()> {
        match self.open.as_mut() {
            Some(open) if open.stream_id == stream_id && open.values.len() < open.declared => {
                open.values.push(value);
                Ok(())
            }
            Some(open) => Err(ProtocolError::CountMismatch {
                stream_id,
                declared: open.declared,
                emitted: open.values.len() + 1,
            }
            .into()),
            None => Err(Self::out_of_order("stream or summary", Section::Stream).into()),
        }
    }

    pub fn end_stream(&mut self, stream_id: StreamId) -> SpyResult<()> {
        let values = self.close(Section::Stream, stream_id)?;
        self.send(Frame::Stream { stream_id, values })
    }

    pub fn end_summary(&mut self, stream_id: StreamId) -> SpyResult<()> {
        let values = self.close(Section::Summary, stream_id)?;
        self.send(Frame::Summary { stream_id, values })
    }

    /// Send the per-tile control classification
    pub fn control(&mut self, first_index: TileIndex, flags: Vec<u8>) -> SpyResult<()> {
        if self.phase != Phase::Body || self.open.is_some() {
            return Err(Self::out_of_order("streams", Section::Control).into());
        }
        self.send(Frame::Control {
            first_index: first_index as u32,
            flags,
        })?;
        self.phase = Phase::Controlled;
        Ok(())
    }

    /// Close the transmission with the overall tracked region size
    pub fn end(mut self, space_size: u64) -> SpyResult<usize> {
        if self.phase != Phase::Controlled {
            return Err(Self::out_of_order("control", Section::End).into());
        }
        self.send(Frame::End { space_size })?;
        self.transport.flush()?;
        self.phase = Phase::Closed;
        Ok(self.frames_sent)
    }
}
