//! Consumer-side scanning of crash events.
//!
//! Fuzz drivers and trace viewers turn `Crash` events into findings. Events
//! are matched by module and struct name only, so a harness package published
//! at any address is recognized.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::events::{EmittedEvent, EventCursor, EventLog};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Minor,
    Medium,
    Major,
    Critical,
}

/// A violation reported by an oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleFinding {
    /// Name of the oracle that produced the finding.
    pub oracle: String,
    pub severity: Severity,
    /// Oracle-specific details.
    pub extra: serde_json::Value,
}

/// Turns `Crash` events into critical findings.
#[derive(Debug, Clone)]
pub struct ViolationScanner {
    oracle: String,
}

impl Default for ViolationScanner {
    fn default() -> Self {
        Self::new("TypedBugOracle")
    }
}

impl ViolationScanner {
    pub fn new(oracle: impl Into<String>) -> Self {
        Self {
            oracle: oracle.into(),
        }
    }

    /// One finding per crash event, in log order.
    ///
    /// A crash whose payload does not decode is still a finding; the raw
    /// payload is reported instead of the reason.
    pub fn scan(&self, events: &[EmittedEvent]) -> Vec<OracleFinding> {
        events
            .iter()
            .filter(|event| event.is_crash())
            .map(|event| self.finding(event))
            .collect()
    }

    pub fn scan_log(&self, log: &EventLog) -> Vec<OracleFinding> {
        self.scan(&log.snapshot())
    }

    /// Scan events appended since the cursor's last poll.
    pub fn scan_cursor(&self, cursor: &mut EventCursor) -> Vec<OracleFinding> {
        self.scan(&cursor.poll())
    }

    fn finding(&self, event: &EmittedEvent) -> OracleFinding {
        debug!(
            sequence = event.sequence,
            tx = event.tx_number,
            "crash event detected"
        );
        let reason = match event.as_crash() {
            Some(Ok(crash)) => json!(crash.reason.msg),
            _ => json!({ "undecodable": hex::encode(&event.data) }),
        };
        OracleFinding {
            oracle: self.oracle.clone(),
            severity: Severity::Critical,
            extra: json!({
                "event": {
                    "type": event.type_tag,
                    "sequence": event.sequence,
                    "tx_number": event.tx_number,
                },
                "reason": reason,
            }),
        }
    }
}
