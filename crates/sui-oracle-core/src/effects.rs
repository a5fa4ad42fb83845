//! Per-transaction effects.
//!
//! The tracker records what the open transaction did to the ledger; at the
//! boundary the runtime folds it into an immutable [`TransactionEffects`].

use std::collections::{BTreeMap, BTreeSet};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use sui_oracle_types::{Address, ObjectId};

use crate::types::{Owner, StoredObject};

/// Observable mutations of exactly one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEffects {
    /// Objects created by the transaction.
    pub created: BTreeSet<ObjectId>,
    /// Pre-existing objects the transaction wrote.
    pub written: BTreeSet<ObjectId>,
    /// Pre-existing objects deleted or wrapped by the transaction.
    pub deleted: BTreeSet<ObjectId>,
    /// Final owner address of objects sent to an account.
    pub transferred_to_account: BTreeMap<ObjectId, Address>,
    /// Parent of objects sent to another object.
    pub transferred_to_object: BTreeMap<ObjectId, ObjectId>,
    /// Objects that ended the transaction shared.
    pub shared: BTreeSet<ObjectId>,
    /// Objects that ended the transaction frozen.
    pub frozen: BTreeSet<ObjectId>,
    /// Number of events emitted by the transaction.
    pub event_count: u64,
}

impl TransactionEffects {
    /// True when the transaction touched nothing and emitted nothing.
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.written.is_empty()
            && self.deleted.is_empty()
            && self.transferred_to_account.is_empty()
            && self.transferred_to_object.is_empty()
            && self.shared.is_empty()
            && self.frozen.is_empty()
            && self.event_count == 0
    }
}

/// Accumulates the open transaction's mutations.
#[derive(Debug, Default)]
pub struct EffectsTracker {
    created: IndexSet<ObjectId>,
    writes: IndexMap<ObjectId, StoredObject>,
    deleted: IndexSet<ObjectId>,
    wrapped: IndexSet<ObjectId>,
    inputs: BTreeMap<ObjectId, Owner>,
    event_count: u64,
}

impl EffectsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_created(&mut self, id: ObjectId) {
        self.created.insert(id);
    }

    /// Record an object taken into the transaction with its owner at take time.
    pub fn record_input(&mut self, id: ObjectId, owner: Owner) {
        self.inputs.entry(id).or_insert(owner);
    }

    /// Record the final state of an object. A later write replaces an earlier one.
    pub fn record_write(&mut self, object: StoredObject) {
        self.deleted.shift_remove(&object.id);
        self.wrapped.shift_remove(&object.id);
        self.writes.insert(object.id, object);
    }

    pub fn record_delete(&mut self, id: ObjectId) {
        self.writes.shift_remove(&id);
        self.wrapped.shift_remove(&id);
        self.deleted.insert(id);
    }

    /// Record an object stored inside another object's value.
    pub fn record_wrapped(&mut self, id: ObjectId) {
        self.writes.shift_remove(&id);
        self.deleted.shift_remove(&id);
        self.wrapped.insert(id);
    }

    pub fn record_event(&mut self) {
        self.event_count += 1;
    }

    pub fn is_created(&self, id: &ObjectId) -> bool {
        self.created.contains(id)
    }

    pub fn is_input(&self, id: &ObjectId) -> bool {
        self.inputs.contains_key(id)
    }

    pub fn is_deleted(&self, id: &ObjectId) -> bool {
        self.deleted.contains(id)
    }

    pub fn is_wrapped(&self, id: &ObjectId) -> bool {
        self.wrapped.contains(id)
    }

    /// Drop the pending write of `id`, keeping it as an input.
    pub fn discard_write(&mut self, id: &ObjectId) -> Option<StoredObject> {
        self.writes.shift_remove(id)
    }

    /// True when the transaction wrote, deleted or wrapped `id`.
    pub fn touches(&self, id: &ObjectId) -> bool {
        self.writes.contains_key(id) || self.deleted.contains(id) || self.wrapped.contains(id)
    }

    /// Pending write of `id`, if the transaction wrote it.
    pub fn pending_write(&self, id: &ObjectId) -> Option<&StoredObject> {
        self.writes.get(id)
    }

    /// Pending writes in the order they were first recorded.
    pub fn writes(&self) -> impl Iterator<Item = &StoredObject> {
        self.writes.values()
    }

    pub fn deleted(&self) -> impl Iterator<Item = &ObjectId> {
        self.deleted.iter()
    }

    pub fn wrapped(&self) -> impl Iterator<Item = &ObjectId> {
        self.wrapped.iter()
    }

    pub fn inputs(&self) -> impl Iterator<Item = (&ObjectId, &Owner)> {
        self.inputs.iter()
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Fold the recorded mutations into effects. Wrapped objects are reported
    /// as deleted; objects created and deleted within the transaction appear nowhere.
    pub fn summarize(&self) -> TransactionEffects {
        let mut effects = TransactionEffects {
            event_count: self.event_count,
            ..Default::default()
        };

        for object in self.writes.values() {
            if self.created.contains(&object.id) {
                effects.created.insert(object.id);
            } else {
                effects.written.insert(object.id);
            }
            match object.owner {
                Owner::Address(addr) => {
                    effects.transferred_to_account.insert(object.id, addr);
                }
                Owner::Object(parent) => {
                    effects.transferred_to_object.insert(object.id, parent);
                }
                Owner::Shared => {
                    effects.shared.insert(object.id);
                }
                Owner::Immutable => {
                    effects.frozen.insert(object.id);
                }
            }
        }

        for id in self.deleted.iter().chain(&self.wrapped) {
            if !self.created.contains(id) {
                effects.deleted.insert(*id);
            }
        }

        effects
    }

    /// Reset for the next transaction.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
