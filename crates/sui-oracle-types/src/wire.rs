//! Wire schema of the harness events.
//!
//! These shapes are BCS-encoded into event payloads and must stay stable:
//! external trace and fuzz tooling decodes them without linking the engine.
//!
//! ```text
//! LogMessage { msg: vector<LogEntry { key: option<string>, value: string }> }
//! Crash      { reason: LogMessage }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::address::{address_to_string, HARNESS_ADDRESS};

/// Module that declares [`LogMessage`].
pub const LOG_MODULE: &str = "log";
/// Struct name of [`LogMessage`] events.
pub const LOG_MESSAGE_STRUCT: &str = "LogMessage";
/// Module that declares [`Crash`].
pub const ORACLE_MODULE: &str = "oracle";
/// Struct name of [`Crash`] events.
pub const CRASH_STRUCT: &str = "Crash";

/// One entry of a structured log line, optionally keyed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub key: Option<String>,
    pub value: String,
}

impl LogEntry {
    pub fn unkeyed(value: impl Into<String>) -> Self {
        Self {
            key: None,
            value: value.into(),
        }
    }

    pub fn keyed(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: value.into(),
        }
    }
}

/// Ordered sequence of log entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    pub msg: Vec<LogEntry>,
}

impl LogMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append an unkeyed entry.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.msg.push(LogEntry::unkeyed(value));
        self
    }

    /// Builder: append a keyed entry.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.msg.push(LogEntry::keyed(key, value));
        self
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.msg.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.msg.is_empty()
    }

    /// First value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.msg
            .iter()
            .find(|e| e.key.as_deref() == Some(key))
            .map(|e| e.value.as_str())
    }
}

impl From<LogEntry> for LogMessage {
    fn from(entry: LogEntry) -> Self {
        Self { msg: vec![entry] }
    }
}

/// Violation signal published by an invariant oracle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crash {
    pub reason: LogMessage,
}

/// Classification of an emitted event by its type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Log,
    Crash,
    Other(String),
}

impl EventKind {
    /// Classify a fully qualified event type (`<address>::<module>::<name>`).
    ///
    /// Only the module and struct name are compared, so the harness package
    /// may be published at any address.
    pub fn from_type_tag(type_tag: &str) -> Self {
        let mut parts = type_tag.rsplitn(3, "::");
        let name = parts.next().unwrap_or_default();
        let module = parts.next().unwrap_or_default();
        match (module, name) {
            (LOG_MODULE, LOG_MESSAGE_STRUCT) => EventKind::Log,
            (ORACLE_MODULE, CRASH_STRUCT) => EventKind::Crash,
            _ => EventKind::Other(type_tag.to_string()),
        }
    }

    /// Fully qualified type tag of this kind under the default harness address.
    pub fn type_tag(&self) -> String {
        let (module, name) = match self {
            EventKind::Log => (LOG_MODULE, LOG_MESSAGE_STRUCT),
            EventKind::Crash => (ORACLE_MODULE, CRASH_STRUCT),
            EventKind::Other(tag) => return tag.clone(),
        };
        format!("{}::{}::{}", address_to_string(&HARNESS_ADDRESS), module, name)
    }
}

/// Decode a `LogMessage` event payload.
pub fn decode_log_message(data: &[u8]) -> Result<LogMessage> {
    bcs::from_bytes(data).context("malformed LogMessage payload")
}

/// Decode a `Crash` event payload.
pub fn decode_crash(data: &[u8]) -> Result<Crash> {
    bcs::from_bytes(data).context("malformed Crash payload")
}
