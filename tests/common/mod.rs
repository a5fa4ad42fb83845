#![allow(dead_code)]
//! Shared test utilities for integration tests.
//!
//! - `counter`: a sample counter contract and its increment oracle
//! - `assertions`: assertion helpers over errors and event logs

pub mod assertions;
pub mod counter;

pub use assertions::{assert_code, crash_count};
pub use counter::{Counter, IncrementOracle};

use sui_oracle_harness::{AccountAddress, Address};

pub const DEPLOYER: Address = AccountAddress::ONE;
pub const ATTACKER: Address = AccountAddress::TWO;
