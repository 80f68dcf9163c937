/*!
 * Shared fixtures for the telemetry tests
 */

#![allow(dead_code)]

use heapspy::core::types::{Address, Size};
use heapspy::{Frame, TransportError, Transport, TreadmillDriver, TreadmillParams};

pub fn params(tile_size: Size, end: Address, threshold: Size) -> TreadmillParams {
    TreadmillParams {
        server_name: "test-server".to_string(),
        tile_size,
        start: 0,
        end,
        threshold,
        main_space: true,
    }
}

/// 128-byte tiles over 1KB, threshold 16 (objects max 8 per tile)
pub fn small_driver() -> TreadmillDriver {
    TreadmillDriver::new(params(128, 1024, 16), 0).expect("valid params")
}

/// Accepts `limit` frames, then reports the monitor gone
pub struct FailingTransport {
    pub limit: usize,
    pub frames: Vec<Frame>,
}

impl FailingTransport {
    pub fn after(limit: usize) -> Self {
        Self {
            limit,
            frames: Vec::new(),
        }
    }
}

impl Transport for FailingTransport {
    fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
        if self.frames.len() >= self.limit {
            return Err(TransportError::Disconnected);
        }
        self.frames.push(frame.clone());
        Ok(())
    }
}
