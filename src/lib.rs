//! Sui Oracle Harness
//!
//! Deterministic, in-process multi-transaction scenarios against a Sui-style
//! object ledger, for writing invariant oracles that run around contract calls:
//!
//! - **Scenarios**: `begin` / `next_tx` / `end` with per-transaction effects
//! - **Inventories**: take/return protocol over shared, owned and frozen objects
//! - **Context store**: stash pre-call snapshots for post-call comparison
//! - **Oracles**: non-aborting `Crash` events and consumer-side scanning
//! - **Reports**: per-run JSON reports of effects and findings
//!
//! See [`sui_oracle_core`] for the engine and [`report`] for run reports.

pub mod report;

pub use sui_oracle_core::*;
pub use sui_oracle_types::{address, env_utils, wire, AccountAddress};

pub use report::{RunRecorder, RunReport, TransactionRecord};
