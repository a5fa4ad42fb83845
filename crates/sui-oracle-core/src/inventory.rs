//! Object inventories and the take/return protocol.
//!
//! Every committed object that a test may retrieve sits in exactly one
//! inventory: the shared inventory, the immutable inventory, or the inventory
//! of its owning address. Within an inventory, objects are grouped by type and
//! kept in insertion order, so "most recent" is the last entry that is not
//! currently taken.
//!
//! Taking an object does not remove it from its inventory; it only marks the
//! ID as taken. Returning clears the mark. Inventories are rebuilt from the
//! written and deleted sets at each transaction boundary, which is what moves
//! a written object to the most-recent position.

use std::collections::BTreeMap;

use indexmap::IndexSet;
use move_core_types::language_storage::StructTag;

use sui_oracle_types::address::address_to_string;
use sui_oracle_types::{Address, ObjectId};

use crate::types::Owner;

/// Which inventory an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InventoryKind {
    Shared,
    Immutable,
    Address(Address),
}

impl InventoryKind {
    /// Owner an object has while it sits in this inventory.
    pub fn owner(&self) -> Owner {
        match self {
            InventoryKind::Shared => Owner::Shared,
            InventoryKind::Immutable => Owner::Immutable,
            InventoryKind::Address(addr) => Owner::Address(*addr),
        }
    }

    /// Inventory an object with `owner` belongs to. Object-owned objects are
    /// not retrievable and have none.
    pub fn for_owner(owner: &Owner) -> Option<Self> {
        match owner {
            Owner::Shared => Some(InventoryKind::Shared),
            Owner::Immutable => Some(InventoryKind::Immutable),
            Owner::Address(addr) => Some(InventoryKind::Address(*addr)),
            Owner::Object(_) => None,
        }
    }
}

impl std::fmt::Display for InventoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InventoryKind::Shared => write!(f, "shared"),
            InventoryKind::Immutable => write!(f, "immutable"),
            InventoryKind::Address(addr) => write!(f, "address {}", address_to_string(addr)),
        }
    }
}

type TypedInventory = BTreeMap<StructTag, IndexSet<ObjectId>>;

#[derive(Debug, Default)]
pub struct ObjectInventory {
    shared: TypedInventory,
    immutable: TypedInventory,
    address: BTreeMap<Address, TypedInventory>,
    taken: BTreeMap<ObjectId, InventoryKind>,
}

impl ObjectInventory {
    pub fn new() -> Self {
        Self::default()
    }

    fn typed(&self, kind: InventoryKind) -> Option<&TypedInventory> {
        match kind {
            InventoryKind::Shared => Some(&self.shared),
            InventoryKind::Immutable => Some(&self.immutable),
            InventoryKind::Address(addr) => self.address.get(&addr),
        }
    }

    fn typed_mut(&mut self, kind: InventoryKind) -> &mut TypedInventory {
        match kind {
            InventoryKind::Shared => &mut self.shared,
            InventoryKind::Immutable => &mut self.immutable,
            InventoryKind::Address(addr) => self.address.entry(addr).or_default(),
        }
    }

    /// Add a committed object under its owner's inventory, as the most recent
    /// of its type. Object-owned objects are ignored.
    pub fn insert(&mut self, type_tag: &StructTag, id: ObjectId, owner: &Owner) {
        let Some(kind) = InventoryKind::for_owner(owner) else {
            return;
        };
        let set = self.typed_mut(kind).entry(type_tag.clone()).or_default();
        set.shift_remove(&id);
        set.insert(id);
    }

    /// Remove an object from every inventory and drop its taken mark.
    pub fn forget(&mut self, id: &ObjectId) {
        let typed = std::iter::once(&mut self.shared)
            .chain(std::iter::once(&mut self.immutable))
            .chain(self.address.values_mut());
        for inventory in typed {
            for set in inventory.values_mut() {
                set.shift_remove(id);
            }
            inventory.retain(|_, set| !set.is_empty());
        }
        self.address.retain(|_, inventory| !inventory.is_empty());
        self.taken.remove(id);
    }

    /// True when `id` sits in the `kind` inventory under `type_tag`, taken or not.
    pub fn contains(&self, kind: InventoryKind, type_tag: &StructTag, id: &ObjectId) -> bool {
        self.typed(kind)
            .and_then(|inventory| inventory.get(type_tag))
            .is_some_and(|set| set.contains(id))
    }

    /// Most recently inserted object of `type_tag` that is not taken.
    pub fn most_recent_id(&self, kind: InventoryKind, type_tag: &StructTag) -> Option<ObjectId> {
        self.typed(kind)?
            .get(type_tag)?
            .iter()
            .rev()
            .find(|id| !self.taken.contains_key(id))
            .copied()
    }

    /// Available objects of `type_tag`, oldest first.
    pub fn ids(&self, kind: InventoryKind, type_tag: &StructTag) -> Vec<ObjectId> {
        self.typed(kind)
            .and_then(|inventory| inventory.get(type_tag))
            .map(|set| {
                set.iter()
                    .filter(|id| !self.taken.contains_key(id))
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_taken(&self, id: &ObjectId) -> bool {
        self.taken.contains_key(id)
    }

    /// True when `id` is currently taken through the `kind` inventory.
    pub fn was_taken_as(&self, kind: InventoryKind, id: &ObjectId) -> bool {
        self.taken.get(id) == Some(&kind)
    }

    pub fn mark_taken(&mut self, kind: InventoryKind, id: ObjectId) {
        self.taken.insert(id, kind);
    }

    /// Clear the taken mark, making the object available again.
    pub fn release(&mut self, id: &ObjectId) -> Option<InventoryKind> {
        self.taken.remove(id)
    }

    /// Objects currently taken, with the inventory they were taken from.
    pub fn taken(&self) -> impl Iterator<Item = (&ObjectId, &InventoryKind)> {
        self.taken.iter()
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

    fn tag(name: &str) -> StructTag {
        struct_tag(AccountAddress::TWO, "m", name).unwrap()
    }

    #[test]
    fn test_most_recent_is_last_untaken() {
        let mut inventory = ObjectInventory::new();
        let t = tag("Pool");
        inventory.insert(&t, id(1), &Owner::Shared);
        inventory.insert(&t, id(2), &Owner::Shared);

        assert_eq!(inventory.most_recent_id(InventoryKind::Shared, &t), Some(id(2)));
        inventory.mark_taken(InventoryKind::Shared, id(2));
        assert_eq!(inventory.most_recent_id(InventoryKind::Shared, &t), Some(id(1)));
        inventory.mark_taken(InventoryKind::Shared, id(1));
        assert_eq!(inventory.most_recent_id(InventoryKind::Shared, &t), None);

        inventory.release(&id(2));
        assert_eq!(inventory.most_recent_id(InventoryKind::Shared, &t), Some(id(2)));
    }

    #[test]
    fn test_reinsert_moves_to_most_recent() {
        let mut inventory = ObjectInventory::new();
        let t = tag("Pool");
        inventory.insert(&t, id(1), &Owner::Shared);
        inventory.insert(&t, id(2), &Owner::Shared);
        inventory.insert(&t, id(1), &Owner::Shared);
        assert_eq!(inventory.ids(InventoryKind::Shared, &t), vec![id(2), id(1)]);
    }

    #[test]
    fn test_inventories_are_separate() {
        let mut inventory = ObjectInventory::new();
        let t = tag("Coin");
        let alice = AccountAddress::ONE;
        inventory.insert(&t, id(1), &Owner::Address(alice));
        inventory.insert(&t, id(2), &Owner::Immutable);
        inventory.insert(&t, id(3), &Owner::Object(id(1)));

        assert_eq!(
            inventory.most_recent_id(InventoryKind::Address(alice), &t),
            Some(id(1))
        );
        assert_eq!(
            inventory.most_recent_id(InventoryKind::Address(AccountAddress::TWO), &t),
            None
        );
        assert_eq!(inventory.most_recent_id(InventoryKind::Immutable, &t), Some(id(2)));
        assert_eq!(inventory.most_recent_id(InventoryKind::Shared, &t), None);
        assert!(!inventory.contains(InventoryKind::Shared, &t, &id(3)));
    }

    #[test]
    fn test_forget_clears_taken() {
        let mut inventory = ObjectInventory::new();
        let t = tag("Pool");
        inventory.insert(&t, id(1), &Owner::Shared);
        inventory.mark_taken(InventoryKind::Shared, id(1));
        assert!(inventory.was_taken_as(InventoryKind::Shared, &id(1)));
        assert!(!inventory.was_taken_as(InventoryKind::Immutable, &id(1)));

        inventory.forget(&id(1));
        assert!(!inventory.is_taken(&id(1)));
        assert!(!inventory.contains(InventoryKind::Shared, &t, &id(1)));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(InventoryKind::Shared.to_string(), "shared");
        assert!(InventoryKind::Address(AccountAddress::ONE)
            .to_string()
            .starts_with("address 0x000"));
    }
}
