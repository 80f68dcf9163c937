/*!
 * Frame Transports
 * Sinks that carry protocol frames to a monitor
 *
 * Writes may block. A failed write is reported to the driver, which abandons
 * the rest of that pass's transmission; nothing here ever panics.
 */

use super::protocol::Frame;
use crate::core::errors::TransportError;
use crate::core::limits::FRAME_CHANNEL_CAPACITY;
use crate::core::serialization::{read_with_size, to_vec_with_size, BincodeError};
use flume::{Receiver, Sender};
use std::io::{Read, Write};

/// Sink for protocol frames
pub trait Transport: Send {
    /// Send one frame
    fn send(&mut self, frame: &Frame) -> Result<(), TransportError>;

    /// Flush buffered frames at the end of a transmission
    fn flush(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Collect frames in memory
impl Transport for Vec<Frame> {
    fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
        self.push(frame.clone());
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
        (**self).send(frame)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        (**self).flush()
    }
}

/// In-process transport backed by a bounded channel
///
/// `send` blocks while the channel is full and fails once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: Sender<Frame>,
}

impl ChannelTransport {
    /// Transport with the default frame channel capacity
    pub fn new() -> (Self, Receiver<Frame>) {
        Self::bounded(FRAME_CHANNEL_CAPACITY)
    }

    /// Create a transport and the receiving end the monitor reads from
    pub fn bounded(capacity: usize) -> (Self, Receiver<Frame>) {
        let (tx, rx) = flume::bounded(capacity);
        (Self { tx }, rx)
    }
}

impl Transport for ChannelTransport {
    fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
        self.tx
            .send(frame.clone())
            .map_err(|_| TransportError::Disconnected)
    }
}

/// Binary transport: each frame is bincode with a 4-byte length prefix
pub struct FramedWriter<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> FramedWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Transport for FramedWriter<W> {
    fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
        let bytes = to_vec_with_size(frame).map_err(|e| TransportError::Encode(e.to_string().into()))?;
        self.writer.write_all(&bytes)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Text transport: one JSON object per line, for debugging
pub struct JsonLinesWriter<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Transport for JsonLinesWriter<W> {
    fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
        let line = crate::core::serialization::json::to_line(frame)
            .map_err(|e| TransportError::Encode(e.to_string().into()))?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Reads frames written by [`FramedWriter`]
pub struct FrameReader<R: Read> {
    reader: R,
}

impl<R: Read> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = Result<Frame, BincodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        read_with_size(&mut self.reader).transpose()
    }
}
