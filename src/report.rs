//! Run reports.
//!
//! A [`RunRecorder`] closes transactions on behalf of the driver, recording
//! each boundary's effects (or error) and scanning the events emitted since
//! the previous boundary for crashes. The resulting [`RunReport`] is plain
//! serde data and is written as pretty JSON.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use sui_oracle_core::{
    Address, EventCursor, LedgerRuntime, OracleFinding, Scenario, ScenarioResult,
    TransactionEffects, ViolationScanner,
};
use sui_oracle_types::address::address_to_string;

/// One closed transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction number within the scenario
    pub tx_number: u64,
    /// Sender of the transaction
    pub sender: String,
    /// When the boundary was processed
    pub closed_at: DateTime<Utc>,
    /// Effects, if the boundary succeeded
    pub effects: Option<TransactionEffects>,
    /// Error message, if it failed
    pub error: Option<String>,
    /// Crash findings emitted during the transaction
    pub findings: Vec<OracleFinding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Name of the run
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub transactions: Vec<TransactionRecord>,
}

impl RunReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started_at: Utc::now(),
            finished_at: None,
            transactions: Vec::new(),
        }
    }

    /// All findings of the run, in transaction order.
    pub fn findings(&self) -> impl Iterator<Item = &OracleFinding> {
        self.transactions.iter().flat_map(|tx| tx.findings.iter())
    }

    pub fn has_violations(&self) -> bool {
        self.findings().next().is_some()
    }

    pub fn failed_transactions(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.transactions.iter().filter(|tx| tx.error.is_some())
    }

    /// Write the report as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report {}", path.display()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("failed to parse report {}", path.display()))
    }
}

/// Records transaction boundaries of one scenario into a [`RunReport`].
pub struct RunRecorder {
    report: RunReport,
    cursor: EventCursor,
    scanner: ViolationScanner,
}

impl RunRecorder {
    /// Start recording `scenario`. Events emitted before this call are ignored.
    pub fn new<R: LedgerRuntime>(name: impl Into<String>, scenario: &Scenario<R>) -> Self {
        Self {
            report: RunReport::new(name),
            cursor: scenario.event_log().cursor(),
            scanner: ViolationScanner::default(),
        }
    }

    pub fn with_scanner(mut self, scanner: ViolationScanner) -> Self {
        self.scanner = scanner;
        self
    }

    /// [`Scenario::next_tx`], recording the closed transaction.
    pub fn next_tx<R: LedgerRuntime>(
        &mut self,
        scenario: &mut Scenario<R>,
        sender: Address,
    ) -> ScenarioResult<TransactionEffects> {
        let (tx_number, closing_sender) = (scenario.txn_number(), scenario.sender());
        let result = scenario.next_tx(sender);
        self.record(tx_number, closing_sender, &result);
        result
    }

    /// [`Scenario::end`], recording the last transaction and finishing the report.
    pub fn end<R: LedgerRuntime>(
        mut self,
        scenario: Scenario<R>,
    ) -> (RunReport, ScenarioResult<TransactionEffects>) {
        let (tx_number, sender) = (scenario.txn_number(), scenario.sender());
        let result = scenario.end();
        self.record(tx_number, sender, &result);
        (self.finish(), result)
    }

    fn record(&mut self, tx_number: u64, sender: Address, result: &ScenarioResult<TransactionEffects>) {
        let findings = self.scanner.scan_cursor(&mut self.cursor);
        let (effects, error) = match result {
            Ok(effects) => (Some(effects.clone()), None),
            Err(e) => (None, Some(e.to_string())),
        };
        self.report.transactions.push(TransactionRecord {
            tx_number,
            sender: address_to_string(&sender),
            closed_at: Utc::now(),
            effects,
            error,
            findings,
        });
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    pub fn finish(mut self) -> RunReport {
        self.report.finished_at = Some(Utc::now());
        info!(
            run = %self.report.name,
            transactions = self.report.transactions.len(),
            findings = self.report.findings().count(),
            "run finished"
        );
        self.report
    }
}
