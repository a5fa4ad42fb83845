//! Append-only event log.
//!
//! Every event a scenario emits (logs, crashes, contract events) is appended
//! here with a global sequence number. The log is shared by handle, so trace
//! and fuzz tooling can poll it with an [`EventCursor`] while the scenario runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use sui_oracle_types::wire::{decode_crash, decode_log_message};
use sui_oracle_types::{Crash, EventKind, LogMessage};

/// An event recorded by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmittedEvent {
    /// Position in the log, starting at 0.
    pub sequence: u64,
    /// Transaction number of the scenario that emitted it.
    pub tx_number: u64,
    /// Fully qualified event type (`0x..::module::Name`).
    pub type_tag: String,
    /// BCS-encoded payload.
    pub data: Vec<u8>,
}

impl EmittedEvent {
    pub fn kind(&self) -> EventKind {
        EventKind::from_type_tag(&self.type_tag)
    }

    pub fn is_crash(&self) -> bool {
        self.kind() == EventKind::Crash
    }

    /// Decode as a crash signal, if this is one.
    pub fn as_crash(&self) -> Option<anyhow::Result<Crash>> {
        self.is_crash().then(|| decode_crash(&self.data))
    }

    /// Decode as a structured log message, if this is one.
    pub fn as_log(&self) -> Option<anyhow::Result<LogMessage>> {
        (self.kind() == EventKind::Log).then(|| decode_log_message(&self.data))
    }
}

#[derive(Default)]
struct EventStore {
    events: Mutex<Vec<EmittedEvent>>,
    counter: AtomicU64,
}

/// Shared, append-only store of emitted events.
#[derive(Clone, Default)]
pub struct EventLog {
    inner: Arc<EventStore>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its sequence number.
    pub fn append(&self, tx_number: u64, type_tag: String, data: Vec<u8>) -> u64 {
        let mut events = self.inner.events.lock();
        let sequence = self.inner.counter.fetch_add(1, Ordering::SeqCst);
        events.push(EmittedEvent {
            sequence,
            tx_number,
            type_tag,
            data,
        });
        sequence
    }

    pub fn len(&self) -> usize {
        self.inner.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every event recorded so far.
    pub fn snapshot(&self) -> Vec<EmittedEvent> {
        self.inner.events.lock().clone()
    }

    /// Events with `sequence >= from`.
    pub fn since(&self, from: u64) -> Vec<EmittedEvent> {
        let events = self.inner.events.lock();
        let start = (from as usize).min(events.len());
        events[start..].to_vec()
    }

    /// Events whose type tag starts with `type_prefix`.
    pub fn by_type(&self, type_prefix: &str) -> Vec<EmittedEvent> {
        self.inner
            .events
            .lock()
            .iter()
            .filter(|e| e.type_tag.starts_with(type_prefix))
            .cloned()
            .collect()
    }

    /// Cursor positioned at the current end of the log.
    pub fn cursor(&self) -> EventCursor {
        EventCursor {
            log: self.clone(),
            next: self.inner.counter.load(Ordering::SeqCst),
        }
    }

    /// Cursor positioned at the start of the log.
    pub fn cursor_from_start(&self) -> EventCursor {
        EventCursor {
            log: self.clone(),
            next: 0,
        }
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog").field("len", &self.len()).finish()
    }
}

/// Incremental reader over an [`EventLog`].
#[derive(Debug, Clone)]
pub struct EventCursor {
    log: EventLog,
    next: u64,
}

impl EventCursor {
    /// Return events appended since the previous poll and advance past them.
    pub fn poll(&mut self) -> Vec<EmittedEvent> {
        let events = self.log.since(self.next);
        if let Some(last) = events.last() {
            self.next = last.sequence + 1;
        }
        events
    }

    /// Sequence number the next poll starts from.
    pub fn position(&self) -> u64 {
        self.next
    }
}

/// Anything events can be emitted into.
///
/// Implemented by the scenario, so log and oracle helpers can be called from
/// contract code with just a `&mut Scenario`.
pub trait EventSink {
    fn emit_event(&mut self, type_tag: String, data: Vec<u8>);
}

/// A bare event log is a sink too; events land under transaction 0.
impl EventSink for EventLog {
    fn emit_event(&mut self, type_tag: String, data: Vec<u8>) {
        self.append(0, type_tag, data);
    }
}
