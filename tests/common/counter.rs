//! Sample counter contract.
//!
//! `create` shares a counter starting at 0; `increment` adds `n`; `set_value`
//! overwrites the value and is the buggy entry point the oracle should catch.

use move_core_types::language_storage::StructTag;
use serde::{Deserialize, Serialize};
use sui_oracle_harness::oracle::assert_invariant;
use sui_oracle_harness::types::struct_tag;
use sui_oracle_harness::{
    AccountAddress, ContextStore, EntryKey, InvariantOracle, MoveObject, ObjectId, Scenario,
    ScenarioResult,
};

pub fn package() -> AccountAddress {
    AccountAddress::from_hex_literal("0xc0ffee").expect("valid literal")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub id: ObjectId,
    pub value: u64,
}

impl MoveObject for Counter {
    fn type_tag() -> StructTag {
        struct_tag(package(), "counter", "Counter").expect("valid tag")
    }

    fn id(&self) -> ObjectId {
        self.id
    }
}

impl Counter {
    /// Create and share a counter. Returns its ID.
    pub fn create(scenario: &mut Scenario) -> ScenarioResult<ObjectId> {
        let counter = Counter {
            id: scenario.new_uid(),
            value: 0,
        };
        let id = counter.id;
        scenario.share_object(counter)?;
        Ok(id)
    }

    pub fn increment(&mut self, n: u64) {
        self.value += n;
    }

    pub fn set_value(&mut self, value: u64) {
        self.value = value;
    }
}

/// Checks that a call moved the most recent counter by exactly `step`.
pub struct IncrementOracle {
    pub step: u64,
}

impl IncrementOracle {
    fn key(id: ObjectId) -> ScenarioResult<EntryKey> {
        EntryKey::namespaced("counter_value", &id)
    }

    fn peek(scenario: &mut Scenario) -> ScenarioResult<Counter> {
        let counter: Counter = scenario.take_shared()?;
        let snapshot = counter.clone();
        scenario.return_shared(counter)?;
        Ok(snapshot)
    }
}

impl InvariantOracle for IncrementOracle {
    fn name(&self) -> &str {
        "IncrementOracle"
    }

    fn before_call(&mut self, scenario: &mut Scenario, store: &ContextStore) -> ScenarioResult<()> {
        let counter = Self::peek(scenario)?;
        store
            .borrow_mut_state()?
            .insert(Self::key(counter.id)?, &counter.value)
    }

    fn after_call(&mut self, scenario: &mut Scenario, store: &ContextStore) -> ScenarioResult<()> {
        let counter = Self::peek(scenario)?;
        let before: u64 = store.borrow_state()?.get(Self::key(counter.id)?)?;
        assert_invariant(
            scenario,
            counter.value == before + self.step,
            format!(
                "counter moved from {} to {}, expected +{}",
                before, counter.value, self.step
            ),
        );
        Ok(())
    }
}
