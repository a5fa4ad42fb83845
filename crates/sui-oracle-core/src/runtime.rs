//! Ledger runtime boundary.
//!
//! The scenario never stores objects itself. Every mutation goes through a
//! [`LedgerRuntime`], which owns committed objects, inventories and the open
//! transaction's effects, and which decides at each boundary whether the
//! transaction respected the ownership model.
//!
//! [`InMemoryRuntime`] is the default implementation. Its boundary follows the
//! ledger's rules:
//!
//! - every written or deleted object must have been created by the
//!   transaction or taken into it, otherwise effects cannot be generated;
//! - a taken shared object may be written back as shared or deleted, but not
//!   transferred, frozen or wrapped;
//! - a taken immutable object may only be returned unchanged.
//!
//! Pending writes become visible in inventories only after a successful
//! boundary. Objects that stay taken across a boundary remain inputs of the
//! next transaction.

use std::collections::BTreeMap;

use move_core_types::language_storage::StructTag;
use tracing::{debug, trace, warn};

use sui_oracle_types::address::address_to_string;
use sui_oracle_types::ObjectId;

use crate::config::ScenarioConfig;
use crate::effects::{EffectsTracker, TransactionEffects};
use crate::errors::{ScenarioError, ScenarioResult};
use crate::events::EventLog;
use crate::inventory::{InventoryKind, ObjectInventory};
use crate::types::{type_name, Owner, StoredObject};

/// Storage and effects engine a scenario runs against.
pub trait LedgerRuntime {
    /// Register an ID minted by the open transaction.
    fn record_new_uid(&mut self, id: ObjectId);

    /// Record the new state of an object (new owner, new contents).
    fn write_object(&mut self, object: StoredObject);

    /// Record deletion of an object.
    fn delete_object(&mut self, id: ObjectId);

    /// Record that an object was stored inside another object's value.
    fn wrap_object(&mut self, id: ObjectId);

    /// Take a specific object out of the `kind` inventory.
    fn take_by_id(
        &mut self,
        kind: InventoryKind,
        type_tag: &StructTag,
        id: ObjectId,
    ) -> ScenarioResult<StoredObject>;

    /// Most recent available object of `type_tag` in the `kind` inventory.
    fn most_recent_id(&self, kind: InventoryKind, type_tag: &StructTag) -> Option<ObjectId>;

    /// Available objects of `type_tag` in the `kind` inventory, oldest first.
    fn ids_for(&self, kind: InventoryKind, type_tag: &StructTag) -> Vec<ObjectId>;

    /// True when `id` is currently taken from the `kind` inventory.
    fn was_taken(&self, kind: InventoryKind, id: ObjectId) -> bool;

    /// Return a taken object to the inventory it was taken from.
    fn return_object(&mut self, kind: InventoryKind, object: StoredObject) -> ScenarioResult<()>;

    /// Append an event to the log and count it against the open transaction.
    fn emit_event(&mut self, tx_number: u64, type_tag: String, data: Vec<u8>);

    /// Close the open transaction and compute its effects.
    fn end_transaction(&mut self) -> ScenarioResult<TransactionEffects>;

    /// Handle to the event log.
    fn event_log(&self) -> EventLog;

    /// Committed state of an object.
    fn object(&self, id: &ObjectId) -> Option<StoredObject>;
}

/// Ledger runtime holding everything in memory.
#[derive(Debug, Default)]
pub struct InMemoryRuntime {
    objects: BTreeMap<ObjectId, StoredObject>,
    inventory: ObjectInventory,
    tracker: EffectsTracker,
    /// Bytes of taken immutable objects at take time.
    taken_immutable_values: BTreeMap<ObjectId, Vec<u8>>,
    events: EventLog,
    lenient_ownership: bool,
}

impl InMemoryRuntime {
    pub fn new(config: &ScenarioConfig) -> Self {
        Self {
            lenient_ownership: !config.enforce_ownership,
            ..Default::default()
        }
    }

    pub fn inventory(&self) -> &ObjectInventory {
        &self.inventory
    }

    /// Effects recorded so far for the open transaction.
    pub fn tracker(&self) -> &EffectsTracker {
        &self.tracker
    }

    fn check_known_objects(&self) -> ScenarioResult<()> {
        let touched = self
            .tracker
            .writes()
            .map(|object| &object.id)
            .chain(self.tracker.deleted())
            .chain(self.tracker.wrapped());
        for id in touched {
            if !self.tracker.is_created(id) && !self.tracker.is_input(id) {
                return Err(ScenarioError::CouldNotGenerateEffects {
                    reason: format!(
                        "object {} was neither created nor taken by the transaction",
                        address_to_string(id)
                    ),
                });
            }
        }
        Ok(())
    }

    /// Collect shared/immutable misuse as `(object, reason)` pairs.
    fn ownership_violations(&self) -> Vec<(ObjectId, String)> {
        let mut violations = Vec::new();
        for (id, input_owner) in self.tracker.inputs() {
            if !matches!(input_owner, Owner::Shared | Owner::Immutable) {
                continue;
            }
            let label = if *input_owner == Owner::Shared {
                "shared"
            } else {
                "immutable"
            };

            if let Some(written) = self.tracker.pending_write(id) {
                if written.owner != *input_owner {
                    violations.push((
                        *id,
                        format!("{} object changed owner to {:?}", label, written.owner),
                    ));
                } else if let Some(before) = self.taken_immutable_values.get(id) {
                    if *before != written.bcs_bytes {
                        violations.push((*id, "immutable object was mutated".to_string()));
                    }
                }
            } else if self.tracker.is_wrapped(id) {
                violations.push((*id, format!("{} object was wrapped", label)));
            } else if self.tracker.is_deleted(id) && *input_owner == Owner::Immutable {
                violations.push((*id, "immutable object was deleted".to_string()));
            }
        }
        violations
    }

    /// Drop the open transaction without committing anything. Objects the
    /// transaction consumed go back to their inventories; objects the caller
    /// still holds stay taken.
    fn discard_transaction(&mut self) {
        let consumed: Vec<ObjectId> = self
            .inventory
            .taken()
            .map(|(id, _)| *id)
            .filter(|id| self.tracker.touches(id))
            .collect();
        for id in &consumed {
            self.inventory.release(id);
        }
        self.tracker.clear();
        self.carry_held_objects();
    }

    /// Seed the next transaction with the objects still taken.
    fn carry_held_objects(&mut self) {
        let held: Vec<(ObjectId, Owner)> = self
            .inventory
            .taken()
            .map(|(id, kind)| (*id, kind.owner()))
            .collect();
        for (id, owner) in held {
            self.tracker.record_input(id, owner);
        }
        let inventory = &self.inventory;
        self.taken_immutable_values
            .retain(|id, _| inventory.is_taken(id));
    }

    fn commit(&mut self) {
        let removed: Vec<ObjectId> = self
            .tracker
            .deleted()
            .chain(self.tracker.wrapped())
            .copied()
            .collect();
        for id in &removed {
            self.objects.remove(id);
            self.inventory.forget(id);
        }

        let writes: Vec<StoredObject> = self.tracker.writes().cloned().collect();
        for mut object in writes {
            object.version = self
                .objects
                .get(&object.id)
                .map(|previous| previous.version + 1)
                .unwrap_or(1);
            self.inventory.forget(&object.id);
            self.inventory
                .insert(&object.type_tag, object.id, &object.owner);
            self.objects.insert(object.id, object);
        }

        self.tracker.clear();
        self.carry_held_objects();
    }
}

impl LedgerRuntime for InMemoryRuntime {
    fn record_new_uid(&mut self, id: ObjectId) {
        self.tracker.record_created(id);
    }

    fn write_object(&mut self, object: StoredObject) {
        trace!(
            object = %address_to_string(&object.id),
            owner = ?object.owner,
            "write object"
        );
        self.tracker.record_write(object);
    }

    fn delete_object(&mut self, id: ObjectId) {
        trace!(object = %address_to_string(&id), "delete object");
        self.tracker.record_delete(id);
    }

    fn wrap_object(&mut self, id: ObjectId) {
        trace!(object = %address_to_string(&id), "wrap object");
        self.tracker.record_wrapped(id);
    }

    fn take_by_id(
        &mut self,
        kind: InventoryKind,
        type_tag: &StructTag,
        id: ObjectId,
    ) -> ScenarioResult<StoredObject> {
        let not_found = || ScenarioError::ObjectNotFound {
            object_id: id,
            type_tag: type_name(type_tag),
            inventory: kind.to_string(),
        };
        if self.inventory.is_taken(&id) || !self.inventory.contains(kind, type_tag, &id) {
            return Err(not_found());
        }
        // Retaking a returned object undoes the return: the caller holds the
        // value again, so it must not be committed at the boundary.
        let object = match self.tracker.discard_write(&id) {
            Some(returned) => returned,
            None => self.objects.get(&id).cloned().ok_or_else(not_found)?,
        };

        self.inventory.mark_taken(kind, id);
        self.tracker.record_input(id, kind.owner());
        if kind == InventoryKind::Immutable {
            self.taken_immutable_values
                .entry(id)
                .or_insert_with(|| object.bcs_bytes.clone());
        }
        trace!(
            object = %address_to_string(&id),
            inventory = %kind,
            "take object"
        );
        Ok(object)
    }

    fn most_recent_id(&self, kind: InventoryKind, type_tag: &StructTag) -> Option<ObjectId> {
        self.inventory.most_recent_id(kind, type_tag)
    }

    fn ids_for(&self, kind: InventoryKind, type_tag: &StructTag) -> Vec<ObjectId> {
        self.inventory.ids(kind, type_tag)
    }

    fn was_taken(&self, kind: InventoryKind, id: ObjectId) -> bool {
        self.inventory.was_taken_as(kind, &id)
    }

    fn return_object(&mut self, kind: InventoryKind, mut object: StoredObject) -> ScenarioResult<()> {
        if !self.inventory.was_taken_as(kind, &object.id)
            || !self.inventory.contains(kind, &object.type_tag, &object.id)
        {
            return Err(ScenarioError::CantReturnObject {
                object_id: object.id,
                inventory: kind.to_string(),
            });
        }
        self.inventory.release(&object.id);
        object.owner = kind.owner();
        trace!(
            object = %address_to_string(&object.id),
            inventory = %kind,
            "return object"
        );
        self.tracker.record_write(object);
        Ok(())
    }

    fn emit_event(&mut self, tx_number: u64, type_tag: String, data: Vec<u8>) {
        self.events.append(tx_number, type_tag, data);
        self.tracker.record_event();
    }

    fn end_transaction(&mut self) -> ScenarioResult<TransactionEffects> {
        if let Err(err) = self.check_known_objects() {
            self.discard_transaction();
            return Err(err);
        }

        let violations = self.ownership_violations();
        if !violations.is_empty() {
            for (id, reason) in &violations {
                warn!(object = %address_to_string(id), "{}", reason);
            }
            if !self.lenient_ownership {
                self.discard_transaction();
                let reason = violations[0].1.clone();
                return Err(ScenarioError::InvalidSharedOrImmutableUsage {
                    object_ids: violations.into_iter().map(|(id, _)| id).collect(),
                    reason,
                });
            }
        }

        let effects = self.tracker.summarize();
        self.commit();
        debug!(
            created = effects.created.len(),
            written = effects.written.len(),
            deleted = effects.deleted.len(),
            events = effects.event_count,
            "transaction committed"
        );
        Ok(effects)
    }

    fn event_log(&self) -> EventLog {
        self.events.clone()
    }

    fn object(&self, id: &ObjectId) -> Option<StoredObject> {
        self.objects.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::struct_tag;
    use sui_oracle_types::AccountAddress;

    fn id(n: u8) -> ObjectId {
        let mut bytes = [0u8; 32];
        bytes[31] = n;
        AccountAddress::new(bytes)
    }

    fn tag() -> StructTag {
        struct_tag(AccountAddress::TWO, "pool", "Pool").unwrap()
    }

    fn object(n: u8, owner: Owner, bytes: Vec<u8>) -> StoredObject {
        StoredObject {
            id: id(n),
            type_tag: tag(),
            bcs_bytes: bytes,
            owner,
            version: 0,
        }
    }

    /// Runtime with one committed object of the given owner.
    fn runtime_with(owner: Owner, config: &ScenarioConfig) -> InMemoryRuntime {
        let mut runtime = InMemoryRuntime::new(config);
        runtime.record_new_uid(id(1));
        runtime.write_object(object(1, owner, vec![0]));
        runtime.end_transaction().unwrap();
        runtime
    }

    #[test]
    fn test_new_objects_visible_after_boundary() {
        let mut runtime = InMemoryRuntime::new(&ScenarioConfig::default());
        runtime.record_new_uid(id(1));
        runtime.write_object(object(1, Owner::Shared, vec![]));
        assert_eq!(runtime.most_recent_id(InventoryKind::Shared, &tag()), None);

        let effects = runtime.end_transaction().unwrap();
        assert!(effects.created.contains(&id(1)));
        assert!(effects.shared.contains(&id(1)));
        assert_eq!(
            runtime.most_recent_id(InventoryKind::Shared, &tag()),
            Some(id(1))
        );
        assert_eq!(runtime.object(&id(1)).unwrap().version, 1);
    }

    #[test]
    fn test_second_take_fails() {
        let mut runtime = runtime_with(Owner::Shared, &ScenarioConfig::default());
        runtime
            .take_by_id(InventoryKind::Shared, &tag(), id(1))
            .unwrap();
        let err = runtime
            .take_by_id(InventoryKind::Shared, &tag(), id(1))
            .unwrap_err();
        assert!(matches!(err, ScenarioError::ObjectNotFound { .. }));
    }

    #[test]
    fn test_take_return_take_same_transaction() {
        let mut runtime = runtime_with(Owner::Shared, &ScenarioConfig::default());
        let mut taken = runtime
            .take_by_id(InventoryKind::Shared, &tag(), id(1))
            .unwrap();
        taken.bcs_bytes = vec![9];
        runtime.return_object(InventoryKind::Shared, taken).unwrap();

        let again = runtime
            .take_by_id(InventoryKind::Shared, &tag(), id(1))
            .unwrap();
        assert_eq!(again.bcs_bytes, vec![9]);
    }

    #[test]
    fn test_retaken_object_stays_held_across_boundary() {
        let mut runtime = runtime_with(Owner::Shared, &ScenarioConfig::default());
        let taken = runtime
            .take_by_id(InventoryKind::Shared, &tag(), id(1))
            .unwrap();
        runtime.return_object(InventoryKind::Shared, taken).unwrap();
        let held = runtime
            .take_by_id(InventoryKind::Shared, &tag(), id(1))
            .unwrap();

        let effects = runtime.end_transaction().unwrap();
        assert!(effects.written.is_empty());
        assert!(runtime.was_taken(InventoryKind::Shared, id(1)));
        assert_eq!(runtime.most_recent_id(InventoryKind::Shared, &tag()), None);
        assert!(runtime
            .take_by_id(InventoryKind::Shared, &tag(), id(1))
            .is_err());

        runtime.return_object(InventoryKind::Shared, held).unwrap();
        let effects = runtime.end_transaction().unwrap();
        assert!(effects.written.contains(&id(1)));
    }

    #[test]
    fn test_failed_boundary_keeps_held_objects_taken() {
        let mut runtime = InMemoryRuntime::new(&ScenarioConfig::default());
        runtime.record_new_uid(id(1));
        runtime.write_object(object(1, Owner::Shared, vec![0]));
        runtime.record_new_uid(id(2));
        runtime.write_object(object(2, Owner::Shared, vec![0]));
        runtime.end_transaction().unwrap();

        let held = runtime
            .take_by_id(InventoryKind::Shared, &tag(), id(1))
            .unwrap();
        let mut moved = runtime
            .take_by_id(InventoryKind::Shared, &tag(), id(2))
            .unwrap();
        moved.owner = Owner::Address(AccountAddress::ONE);
        runtime.write_object(moved);
        assert!(runtime.end_transaction().is_err());

        // The rejected transfer is rolled back, the held object is not.
        assert!(!runtime.was_taken(InventoryKind::Shared, id(2)));
        assert!(runtime.was_taken(InventoryKind::Shared, id(1)));
        assert_eq!(
            runtime.most_recent_id(InventoryKind::Shared, &tag()),
            Some(id(2))
        );

        runtime.return_object(InventoryKind::Shared, held).unwrap();
        let effects = runtime.end_transaction().unwrap();
        assert!(effects.written.contains(&id(1)));
    }

    #[test]
    fn test_failed_boundary_keeps_held_immutable_snapshot() {
        let mut runtime = runtime_with(Owner::Immutable, &ScenarioConfig::default());
        let mut held = runtime
            .take_by_id(InventoryKind::Immutable, &tag(), id(1))
            .unwrap();
        runtime.write_object(object(9, Owner::Shared, vec![]));
        assert!(runtime.end_transaction().is_err());

        held.bcs_bytes = vec![7];
        runtime.return_object(InventoryKind::Immutable, held).unwrap();
        let err = runtime.end_transaction().unwrap_err();
        assert_eq!(
            err.code(),
            crate::errors::E_INVALID_SHARED_OR_IMMUTABLE_USAGE
        );
    }

    #[test]
    fn test_return_requires_matching_take() {
        let mut runtime = runtime_with(Owner::Shared, &ScenarioConfig::default());
        let err = runtime
            .return_object(InventoryKind::Shared, object(1, Owner::Shared, vec![0]))
            .unwrap_err();
        assert!(matches!(err, ScenarioError::CantReturnObject { .. }));

        runtime
            .take_by_id(InventoryKind::Shared, &tag(), id(1))
            .unwrap();
        let err = runtime
            .return_object(InventoryKind::Immutable, object(1, Owner::Shared, vec![0]))
            .unwrap_err();
        assert_eq!(err.code(), crate::errors::E_CANT_RETURN_OBJECT);
    }

    #[test]
    fn test_unknown_write_cannot_generate_effects() {
        let mut runtime = InMemoryRuntime::new(&ScenarioConfig::default());
        runtime.write_object(object(7, Owner::Shared, vec![]));
        let err = runtime.end_transaction().unwrap_err();
        assert!(matches!(err, ScenarioError::CouldNotGenerateEffects { .. }));
        // Discarded: the next boundary is clean.
        assert!(runtime.end_transaction().unwrap().is_empty());
    }

    #[test]
    fn test_shared_transfer_is_violation() {
        let mut runtime = runtime_with(Owner::Shared, &ScenarioConfig::default());
        let mut taken = runtime
            .take_by_id(InventoryKind::Shared, &tag(), id(1))
            .unwrap();
        taken.owner = Owner::Address(AccountAddress::ONE);
        runtime.write_object(taken);

        let err = runtime.end_transaction().unwrap_err();
        assert_eq!(
            err.code(),
            crate::errors::E_INVALID_SHARED_OR_IMMUTABLE_USAGE
        );
        // Rolled back: still shared and available.
        assert_eq!(
            runtime.most_recent_id(InventoryKind::Shared, &tag()),
            Some(id(1))
        );
    }

    #[test]
    fn test_shared_delete_allowed() {
        let mut runtime = runtime_with(Owner::Shared, &ScenarioConfig::default());
        runtime
            .take_by_id(InventoryKind::Shared, &tag(), id(1))
            .unwrap();
        runtime.delete_object(id(1));
        let effects = runtime.end_transaction().unwrap();
        assert!(effects.deleted.contains(&id(1)));
        assert!(runtime.object(&id(1)).is_none());
    }

    #[test]
    fn test_immutable_rules() {
        let config = ScenarioConfig::default();

        let mut runtime = runtime_with(Owner::Immutable, &config);
        runtime
            .take_by_id(InventoryKind::Immutable, &tag(), id(1))
            .unwrap();
        runtime.delete_object(id(1));
        assert!(runtime.end_transaction().is_err());

        let mut runtime = runtime_with(Owner::Immutable, &config);
        let mut taken = runtime
            .take_by_id(InventoryKind::Immutable, &tag(), id(1))
            .unwrap();
        taken.bcs_bytes = vec![1];
        runtime.return_object(InventoryKind::Immutable, taken).unwrap();
        assert!(runtime.end_transaction().is_err());

        let mut runtime = runtime_with(Owner::Immutable, &config);
        let taken = runtime
            .take_by_id(InventoryKind::Immutable, &tag(), id(1))
            .unwrap();
        runtime.return_object(InventoryKind::Immutable, taken).unwrap();
        let effects = runtime.end_transaction().unwrap();
        assert!(effects.frozen.contains(&id(1)));
    }

    #[test]
    fn test_wrapped_shared_is_violation() {
        let mut runtime = runtime_with(Owner::Shared, &ScenarioConfig::default());
        runtime
            .take_by_id(InventoryKind::Shared, &tag(), id(1))
            .unwrap();
        runtime.wrap_object(id(1));
        assert!(runtime.end_transaction().is_err());
    }

    #[test]
    fn test_lenient_ownership_commits() {
        let config = ScenarioConfig::default().with_ownership_enforcement(false);
        let mut runtime = runtime_with(Owner::Shared, &config);
        let mut taken = runtime
            .take_by_id(InventoryKind::Shared, &tag(), id(1))
            .unwrap();
        taken.owner = Owner::Address(AccountAddress::ONE);
        runtime.write_object(taken);

        let effects = runtime.end_transaction().unwrap();
        assert!(effects.transferred_to_account.contains_key(&id(1)));
        assert_eq!(
            runtime.most_recent_id(InventoryKind::Address(AccountAddress::ONE), &tag()),
            Some(id(1))
        );
    }

    #[test]
    fn test_taken_object_survives_boundary() {
        let mut runtime = runtime_with(Owner::Shared, &ScenarioConfig::default());
        let taken = runtime
            .take_by_id(InventoryKind::Shared, &tag(), id(1))
            .unwrap();
        let effects = runtime.end_transaction().unwrap();
        assert!(effects.is_empty());
        assert!(runtime.was_taken(InventoryKind::Shared, id(1)));

        runtime.return_object(InventoryKind::Shared, taken).unwrap();
        let effects = runtime.end_transaction().unwrap();
        assert!(effects.written.contains(&id(1)));
        assert_eq!(runtime.object(&id(1)).unwrap().version, 2);
    }

    #[test]
    fn test_events_counted_per_transaction() {
        let mut runtime = InMemoryRuntime::new(&ScenarioConfig::default());
        runtime.emit_event(0, "0x2::e::E".into(), vec![]);
        runtime.emit_event(0, "0x2::e::E".into(), vec![]);
        assert_eq!(runtime.end_transaction().unwrap().event_count, 2);
        assert_eq!(runtime.end_transaction().unwrap().event_count, 0);
        assert_eq!(runtime.event_log().len(), 2);
    }
}
