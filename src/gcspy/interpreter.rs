/*!
 * Server Interpreter
 * Tracks monitor attachment, enabled collection events and space ids
 */

use crate::core::data_structures::InlineString;
use crate::core::limits::MAX_EVENTS;
use crate::core::types::{EventId, SpaceId};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Answers whether a monitor wants data for an event
pub trait MonitorLink: Send + Sync {
    fn is_connected(&self, event: EventId) -> bool;
}

/// A plain flag: attached or not, for every event
impl MonitorLink for bool {
    #[inline]
    fn is_connected(&self, _event: EventId) -> bool {
        *self
    }
}

/// Collection events every interpreter registers up front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum GcEvent {
    PassStart = 0,
    PassEnd = 1,
}

impl GcEvent {
    #[inline]
    pub const fn id(self) -> EventId {
        self as EventId
    }

    pub const fn name(self) -> &'static str {
        match self {
            GcEvent::PassStart => "Start of GC",
            GcEvent::PassEnd => "End of GC",
        }
    }
}

#[derive(Debug)]
struct InterpreterInner {
    name: InlineString,
    attached: AtomicBool,
    /// Bit i set when event i is enabled
    enabled: AtomicU32,
    events: RwLock<Vec<InlineString>>,
    next_space_id: AtomicU32,
}

/// Monitor-facing side of the telemetry layer
///
/// Cheap to clone; the transport thread toggles attachment while collector
/// threads poll `is_connected`.
#[derive(Debug, Clone)]
pub struct ServerInterpreter {
    inner: Arc<InterpreterInner>,
}

impl ServerInterpreter {
    /// Create an interpreter with the standard pass events registered
    pub fn new(name: &str) -> Self {
        let interpreter = Self {
            inner: Arc::new(InterpreterInner {
                name: name.into(),
                attached: AtomicBool::new(false),
                enabled: AtomicU32::new(u32::MAX),
                events: RwLock::new(Vec::new()),
                next_space_id: AtomicU32::new(0),
            }),
        };
        interpreter.add_event(GcEvent::PassStart.name());
        interpreter.add_event(GcEvent::PassEnd.name());
        info!(server = name, "Server interpreter initialized");
        interpreter
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Register a collection event, returning its id
    ///
    /// Returns `None` once `MAX_EVENTS` are registered.
    pub fn add_event(&self, name: &str) -> Option<EventId> {
        let mut events = self.inner.events.write();
        if events.len() >= MAX_EVENTS {
            warn!(event = name, max = MAX_EVENTS, "Event table full");
            return None;
        }
        events.push(name.into());
        Some((events.len() - 1) as EventId)
    }

    pub fn event_names(&self) -> Vec<InlineString> {
        self.inner.events.read().clone()
    }

    /// Next server space id; ids are never reused
    pub fn next_space_id(&self) -> SpaceId {
        self.inner.next_space_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn attach(&self) {
        self.inner.attached.store(true, Ordering::Release);
        info!(server = %self.inner.name, "Monitor attached");
    }

    pub fn detach(&self) {
        self.inner.attached.store(false, Ordering::Release);
        info!(server = %self.inner.name, "Monitor detached");
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.inner.attached.load(Ordering::Acquire)
    }

    pub fn enable_event(&self, event: EventId) {
        if let Some(bit) = Self::bit(event) {
            self.inner.enabled.fetch_or(bit, Ordering::AcqRel);
            debug!(event, "Event enabled");
        }
    }

    pub fn disable_event(&self, event: EventId) {
        if let Some(bit) = Self::bit(event) {
            self.inner.enabled.fetch_and(!bit, Ordering::AcqRel);
            debug!(event, "Event disabled");
        }
    }

    #[inline]
    pub fn is_event_enabled(&self, event: EventId) -> bool {
        Self::bit(event).is_some_and(|bit| self.inner.enabled.load(Ordering::Acquire) & bit != 0)
    }

    #[inline]
    fn bit(event: EventId) -> Option<u32> {
        ((event as usize) < MAX_EVENTS).then(|| 1u32 << event)
    }
}

impl MonitorLink for ServerInterpreter {
    #[inline]
    fn is_connected(&self, event: EventId) -> bool {
        self.is_attached() && self.is_event_enabled(event)
    }
}
