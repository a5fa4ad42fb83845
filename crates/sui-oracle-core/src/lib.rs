//! Sui Oracle Core
//!
//! Deterministic, in-process engine for multi-transaction scenarios against a
//! Sui-style object ledger, plus the pieces invariant oracles are built from.
//!
//! # Core Modules
//!
//! - [`scenario`]: the scenario state machine (`begin` / `next_tx` / `end`)
//! - [`inventory`]: take/return protocol over shared, owned and frozen objects
//! - [`runtime`]: the ledger runtime boundary and its in-memory implementation
//! - [`effects`]: per-transaction effects tracking
//! - [`context_store`]: long-lived keyed stash for pre/post-call snapshots
//! - [`log`] and [`oracle`]: structured log events and the non-aborting crash signal
//! - [`findings`]: consumer-side scanning of crash events
//!
//! # Example
//!
//! ```ignore
//! use sui_oracle_core::scenario::Scenario;
//!
//! let mut scenario = Scenario::begin(deployer);
//! counter::create(&mut scenario)?;
//! scenario.next_tx(attacker)?;
//! let mut counter: Counter = scenario.take_shared()?;
//! counter.value += 1;
//! scenario.return_shared(counter)?;
//! let effects = scenario.end()?;
//! ```

pub mod config;
pub mod context_store;
pub mod effects;
pub mod errors;
pub mod events;
pub mod findings;
pub mod inventory;
pub mod log;
pub mod oracle;
pub mod runtime;
pub mod scenario;
pub mod tx_context;
pub mod types;

pub use config::ScenarioConfig;
pub use context_store::{ContextAdminCap, ContextStore, EntryKey, StashedValue};
pub use effects::{EffectsTracker, TransactionEffects};
pub use errors::{ScenarioError, ScenarioResult};
pub use events::{EmittedEvent, EventCursor, EventLog, EventSink};
pub use findings::{OracleFinding, Severity, ViolationScanner};
pub use inventory::{InventoryKind, ObjectInventory};
pub use oracle::{emit_crash, guarded_call, InvariantOracle};
pub use runtime::{InMemoryRuntime, LedgerRuntime};
pub use scenario::Scenario;
pub use tx_context::TxContext;
pub use types::{MoveEvent, MoveObject, Owner, StoredObject};

pub use sui_oracle_types::{Address, Crash, LogEntry, LogMessage, ObjectId};
