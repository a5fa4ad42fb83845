//! Multi-transaction scenarios.
//!
//! A [`Scenario`] is `Open(n)` from [`Scenario::begin`] until [`Scenario::end`]
//! consumes it. Each [`Scenario::next_tx`] closes transaction `n`, returns its
//! effects and opens transaction `n + 1` under the given sender with a fresh
//! context derived from `n + 1`, so IDs minted in different transactions
//! never collide.
//!
//! Contract code drives the ledger through the object API on the scenario
//! (`share_object`, `transfer_to_address`, `take_shared`, ...). Events go to
//! the runtime's [`EventLog`] through the [`EventSink`] impl.

use move_core_types::language_storage::StructTag;
use tracing::debug;

use sui_oracle_types::address::address_to_string;
use sui_oracle_types::{Address, ObjectId};

use crate::config::ScenarioConfig;
use crate::effects::TransactionEffects;
use crate::errors::{ScenarioError, ScenarioResult};
use crate::events::{EventLog, EventSink};
use crate::inventory::InventoryKind;
use crate::runtime::{InMemoryRuntime, LedgerRuntime};
use crate::tx_context::TxContext;
use crate::types::{type_name, MoveEvent, MoveObject, Owner, StoredObject};

pub struct Scenario<R: LedgerRuntime = InMemoryRuntime> {
    txn_number: u64,
    ctx: TxContext,
    runtime: R,
}

impl Scenario<InMemoryRuntime> {
    /// Begin a scenario with the default configuration.
    pub fn begin(sender: Address) -> Self {
        Self::begin_with_config(sender, &ScenarioConfig::default())
    }

    pub fn begin_with_config(sender: Address, config: &ScenarioConfig) -> Self {
        Self::begin_with(InMemoryRuntime::new(config), sender, config)
    }
}

impl<R: LedgerRuntime> Scenario<R> {
    /// Begin a scenario on an injected runtime. The first transaction is 0.
    pub fn begin_with(runtime: R, sender: Address, config: &ScenarioConfig) -> Self {
        debug!(sender = %address_to_string(&sender), "begin scenario");
        Self {
            txn_number: 0,
            ctx: TxContext::from_hint(sender, 0, config.epoch, config.epoch_timestamp_ms, 0),
            runtime,
        }
    }

    /// Close the open transaction and open the next one under `sender`.
    ///
    /// On failure the transaction number and context are unchanged and the
    /// runtime has discarded the pending transaction.
    pub fn next_tx(&mut self, sender: Address) -> ScenarioResult<TransactionEffects> {
        let (epoch, epoch_timestamp_ms) = (self.ctx.epoch(), self.ctx.epoch_timestamp_ms());
        self.advance(sender, epoch, epoch_timestamp_ms)
    }

    /// Like [`Scenario::next_tx`], also moving to the next epoch.
    pub fn next_epoch(&mut self, sender: Address) -> ScenarioResult<TransactionEffects> {
        self.later_epoch(0, sender)
    }

    /// Like [`Scenario::next_epoch`], also moving the epoch timestamp forward by `delta_ms`.
    ///
    /// Fails with [`ScenarioError::EpochOverflow`] before touching the open
    /// transaction if either field would overflow.
    pub fn later_epoch(
        &mut self,
        delta_ms: u64,
        sender: Address,
    ) -> ScenarioResult<TransactionEffects> {
        let (epoch, epoch_timestamp_ms) = (self.ctx.epoch(), self.ctx.epoch_timestamp_ms());
        let overflow = || ScenarioError::EpochOverflow {
            epoch,
            epoch_timestamp_ms,
            delta_ms,
        };
        let next_epoch = epoch.checked_add(1).ok_or_else(overflow)?;
        let next_timestamp = epoch_timestamp_ms
            .checked_add(delta_ms)
            .ok_or_else(overflow)?;
        self.advance(sender, next_epoch, next_timestamp)
    }

    fn advance(
        &mut self,
        sender: Address,
        epoch: u64,
        epoch_timestamp_ms: u64,
    ) -> ScenarioResult<TransactionEffects> {
        let effects = self.runtime.end_transaction()?;
        self.txn_number += 1;
        self.ctx = TxContext::from_hint(sender, self.txn_number, epoch, epoch_timestamp_ms, 0);
        debug!(
            txn = self.txn_number,
            sender = %address_to_string(&sender),
            epoch,
            "next transaction"
        );
        Ok(effects)
    }

    /// Close the last transaction and end the scenario.
    pub fn end(mut self) -> ScenarioResult<TransactionEffects> {
        let effects = self.runtime.end_transaction()?;
        debug!(txn = self.txn_number, "end scenario");
        Ok(effects)
    }

    pub fn txn_number(&self) -> u64 {
        self.txn_number
    }

    pub fn sender(&self) -> Address {
        self.ctx.sender()
    }

    pub fn ctx(&self) -> &TxContext {
        &self.ctx
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    pub fn event_log(&self) -> EventLog {
        self.runtime.event_log()
    }

    // =========================================================================
    // Object API
    // =========================================================================

    /// Mint a fresh object ID in the open transaction.
    pub fn new_uid(&mut self) -> ObjectId {
        let id = self.ctx.fresh_id();
        self.runtime.record_new_uid(id);
        id
    }

    fn write<T: MoveObject>(&mut self, value: &T, owner: Owner) -> ScenarioResult<()> {
        let object = StoredObject::from_value(value, owner)?;
        self.runtime.write_object(object);
        Ok(())
    }

    pub fn share_object<T: MoveObject>(&mut self, value: T) -> ScenarioResult<()> {
        self.write(&value, Owner::Shared)
    }

    pub fn transfer_to_address<T: MoveObject>(
        &mut self,
        value: T,
        recipient: Address,
    ) -> ScenarioResult<()> {
        self.write(&value, Owner::Address(recipient))
    }

    /// Transfer to the sender of the open transaction.
    pub fn transfer_to_sender<T: MoveObject>(&mut self, value: T) -> ScenarioResult<()> {
        let sender = self.sender();
        self.transfer_to_address(value, sender)
    }

    pub fn transfer_to_object<T: MoveObject>(
        &mut self,
        value: T,
        parent: ObjectId,
    ) -> ScenarioResult<()> {
        self.write(&value, Owner::Object(parent))
    }

    pub fn freeze_object<T: MoveObject>(&mut self, value: T) -> ScenarioResult<()> {
        self.write(&value, Owner::Immutable)
    }

    pub fn delete_object<T: MoveObject>(&mut self, value: T) {
        self.runtime.delete_object(value.id());
    }

    /// Record that `value` is now stored inside another object. The caller
    /// keeps the value inside its parent.
    pub fn wrap_object<T: MoveObject>(&mut self, value: &T) {
        self.runtime.wrap_object(value.id());
    }

    /// Emit a typed event.
    pub fn emit<E: MoveEvent>(&mut self, event: &E) -> ScenarioResult<()> {
        let tag = E::type_tag();
        let data = bcs::to_bytes(event).map_err(|e| ScenarioError::codec(type_name(&tag), e))?;
        self.emit_event(tag.to_string(), data);
        Ok(())
    }

    // =========================================================================
    // Inventory API
    // =========================================================================

    fn take_from<T: MoveObject>(&mut self, kind: InventoryKind) -> ScenarioResult<T> {
        let tag = T::type_tag();
        let id = self
            .runtime
            .most_recent_id(kind, &tag)
            .ok_or_else(|| ScenarioError::EmptyInventory {
                type_tag: type_name(&tag),
                inventory: kind.to_string(),
            })?;
        self.take_by_id_from(kind, &tag, id)
    }

    fn take_by_id_from<T: MoveObject>(
        &mut self,
        kind: InventoryKind,
        tag: &StructTag,
        id: ObjectId,
    ) -> ScenarioResult<T> {
        self.runtime.take_by_id(kind, tag, id)?.decode()
    }

    fn return_to<T: MoveObject>(&mut self, kind: InventoryKind, value: T) -> ScenarioResult<()> {
        let object = StoredObject::from_value(&value, kind.owner())?;
        self.runtime.return_object(kind, object)
    }

    // Shared

    /// Take the most recently shared available `T`.
    pub fn take_shared<T: MoveObject>(&mut self) -> ScenarioResult<T> {
        self.take_from(InventoryKind::Shared)
    }

    pub fn take_shared_by_id<T: MoveObject>(&mut self, id: ObjectId) -> ScenarioResult<T> {
        self.take_by_id_from(InventoryKind::Shared, &T::type_tag(), id)
    }

    pub fn return_shared<T: MoveObject>(&mut self, value: T) -> ScenarioResult<()> {
        self.return_to(InventoryKind::Shared, value)
    }

    pub fn most_recent_id_shared<T: MoveObject>(&self) -> Option<ObjectId> {
        self.runtime
            .most_recent_id(InventoryKind::Shared, &T::type_tag())
    }

    pub fn has_most_recent_shared<T: MoveObject>(&self) -> bool {
        self.most_recent_id_shared::<T>().is_some()
    }

    pub fn ids_for_shared<T: MoveObject>(&self) -> Vec<ObjectId> {
        self.runtime.ids_for(InventoryKind::Shared, &T::type_tag())
    }

    pub fn was_taken_shared(&self, id: ObjectId) -> bool {
        self.runtime.was_taken(InventoryKind::Shared, id)
    }

    // Address-owned

    pub fn take_from_sender<T: MoveObject>(&mut self) -> ScenarioResult<T> {
        let sender = self.sender();
        self.take_from_address(sender)
    }

    pub fn take_from_sender_by_id<T: MoveObject>(&mut self, id: ObjectId) -> ScenarioResult<T> {
        let sender = self.sender();
        self.take_from_address_by_id(sender, id)
    }

    pub fn take_from_address<T: MoveObject>(&mut self, account: Address) -> ScenarioResult<T> {
        self.take_from(InventoryKind::Address(account))
    }

    pub fn take_from_address_by_id<T: MoveObject>(
        &mut self,
        account: Address,
        id: ObjectId,
    ) -> ScenarioResult<T> {
        self.take_by_id_from(InventoryKind::Address(account), &T::type_tag(), id)
    }

    pub fn most_recent_id_for_sender<T: MoveObject>(&self) -> Option<ObjectId> {
        self.most_recent_id_for_address::<T>(self.sender())
    }

    pub fn most_recent_id_for_address<T: MoveObject>(&self, account: Address) -> Option<ObjectId> {
        self.runtime
            .most_recent_id(InventoryKind::Address(account), &T::type_tag())
    }

    pub fn has_most_recent_for_sender<T: MoveObject>(&self) -> bool {
        self.most_recent_id_for_sender::<T>().is_some()
    }

    pub fn has_most_recent_for_address<T: MoveObject>(&self, account: Address) -> bool {
        self.most_recent_id_for_address::<T>(account).is_some()
    }

    pub fn ids_for_sender<T: MoveObject>(&self) -> Vec<ObjectId> {
        self.ids_for_address::<T>(self.sender())
    }

    pub fn ids_for_address<T: MoveObject>(&self, account: Address) -> Vec<ObjectId> {
        self.runtime
            .ids_for(InventoryKind::Address(account), &T::type_tag())
    }

    pub fn was_taken_from_sender(&self, id: ObjectId) -> bool {
        self.was_taken_from_address(self.sender(), id)
    }

    pub fn was_taken_from_address(&self, account: Address, id: ObjectId) -> bool {
        self.runtime.was_taken(InventoryKind::Address(account), id)
    }

    pub fn return_to_sender<T: MoveObject>(&mut self, value: T) -> ScenarioResult<()> {
        let sender = self.sender();
        self.return_to_address(sender, value)
    }

    pub fn return_to_address<T: MoveObject>(
        &mut self,
        account: Address,
        value: T,
    ) -> ScenarioResult<()> {
        self.return_to(InventoryKind::Address(account), value)
    }

    // Immutable

    pub fn take_immutable<T: MoveObject>(&mut self) -> ScenarioResult<T> {
        self.take_from(InventoryKind::Immutable)
    }

    pub fn take_immutable_by_id<T: MoveObject>(&mut self, id: ObjectId) -> ScenarioResult<T> {
        self.take_by_id_from(InventoryKind::Immutable, &T::type_tag(), id)
    }

    pub fn most_recent_immutable_id<T: MoveObject>(&self) -> Option<ObjectId> {
        self.runtime
            .most_recent_id(InventoryKind::Immutable, &T::type_tag())
    }

    pub fn has_most_recent_immutable<T: MoveObject>(&self) -> bool {
        self.most_recent_immutable_id::<T>().is_some()
    }

    pub fn was_taken_immutable(&self, id: ObjectId) -> bool {
        self.runtime.was_taken(InventoryKind::Immutable, id)
    }

    /// Return a frozen object. Its value must be unchanged.
    pub fn return_immutable<T: MoveObject>(&mut self, value: T) -> ScenarioResult<()> {
        self.return_to(InventoryKind::Immutable, value)
    }
}

impl<R: LedgerRuntime> EventSink for Scenario<R> {
    fn emit_event(&mut self, type_tag: String, data: Vec<u8>) {
        self.runtime.emit_event(self.txn_number, type_tag, data);
    }
}

impl<R: LedgerRuntime> std::fmt::Debug for Scenario<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("txn_number", &self.txn_number)
            .field("sender", &address_to_string(&self.ctx.sender()))
            .field("epoch", &self.ctx.epoch())
            .finish()
    }
}
