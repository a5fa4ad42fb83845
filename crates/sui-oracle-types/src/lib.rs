//! Shared types for the sui-oracle-harness workspace.
//!
//! This crate holds the pieces that both the engine and external consumers
//! (trace viewers, fuzz drivers) need to agree on:
//!
//! - [`address`] - canonical text form of addresses and object IDs
//! - [`wire`] - the stable BCS wire schema of log and crash events
//! - [`env_utils`] - environment variable parsing used by configuration

pub mod address;
pub mod env_utils;
pub mod wire;

pub use move_core_types::account_address::AccountAddress;

/// Account address of a transaction sender or recipient.
pub type Address = AccountAddress;

/// Identifier of a ledger object. Object IDs share the 32-byte address space.
pub type ObjectId = AccountAddress;

pub use wire::{Crash, EventKind, LogEntry, LogMessage};
