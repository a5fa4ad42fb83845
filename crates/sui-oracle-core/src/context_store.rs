//! Long-lived context store for invariant snapshots.
//!
//! One store exists per deployment. A pre-call oracle stashes values under a
//! key, and the matching post-call oracle reads them back under the same key,
//! possibly several transactions later. Handles are cheap clones of the same
//! underlying state.
//!
//! Values are stored as BCS bytes tagged with the Rust type they were stashed
//! as, so reading a value back as a different type is reported instead of
//! silently reinterpreting bytes.

use std::collections::BTreeMap;
use std::sync::Arc;

use move_core_types::ident_str;
use move_core_types::language_storage::StructTag;
use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use sui_oracle_types::address::{address_to_string, HARNESS_ADDRESS};
use sui_oracle_types::ObjectId;

use crate::errors::{ScenarioError, ScenarioResult};
use crate::runtime::LedgerRuntime;
use crate::scenario::Scenario;
use crate::types::MoveObject;

/// Key of a stashed value: the BCS bytes of a caller-chosen key, optionally
/// under a namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryKey {
    namespace: Option<String>,
    bytes: Vec<u8>,
}

impl EntryKey {
    pub fn new<K: Serialize + ?Sized>(key: &K) -> ScenarioResult<Self> {
        let bytes = bcs::to_bytes(key).map_err(|e| ScenarioError::codec("context key", e))?;
        Ok(Self {
            namespace: None,
            bytes,
        })
    }

    /// Key scoped to `namespace`, so two oracles keyed by the same object
    /// don't overwrite each other.
    pub fn namespaced<K: Serialize + ?Sized>(
        namespace: impl Into<String>,
        key: &K,
    ) -> ScenarioResult<Self> {
        Ok(Self {
            namespace: Some(namespace.into()),
            ..Self::new(key)?
        })
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<ObjectId> for EntryKey {
    fn from(id: ObjectId) -> Self {
        Self {
            namespace: None,
            bytes: id.to_vec(),
        }
    }
}

impl std::fmt::Display for EntryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(namespace) = &self.namespace {
            write!(f, "{}/", namespace)?;
        }
        write!(f, "0x{}", hex::encode(&self.bytes))
    }
}

/// A stashed value with the name of the type it was stashed as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashedValue {
    pub type_name: String,
    pub bcs_bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct ContextState {
    id: ObjectId,
    entries: BTreeMap<EntryKey, StashedValue>,
}

pub type ContextStateRef<'a> = MappedRwLockReadGuard<'a, ContextState>;
pub type ContextStateMut<'a> = MappedRwLockWriteGuard<'a, ContextState>;

impl ContextState {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Read a value stashed under `key` as `V`.
    pub fn get<V: DeserializeOwned>(&self, key: impl Into<EntryKey>) -> ScenarioResult<V> {
        let key = key.into();
        let stashed = self
            .entries
            .get(&key)
            .ok_or_else(|| ScenarioError::MissingContextEntry {
                key: key.to_string(),
            })?;
        let expected = std::any::type_name::<V>();
        if stashed.type_name != expected {
            return Err(ScenarioError::ContextTypeMismatch {
                key: key.to_string(),
                expected: expected.to_string(),
                stored: stashed.type_name.clone(),
            });
        }
        bcs::from_bytes(&stashed.bcs_bytes).map_err(|e| ScenarioError::codec(expected, e))
    }

    pub fn contains(&self, key: impl Into<EntryKey>) -> bool {
        self.entries.contains_key(&key.into())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &EntryKey> {
        self.entries.keys()
    }

    /// Stash `value` under `key`, replacing any previous value.
    pub fn insert<V: Serialize>(&mut self, key: impl Into<EntryKey>, value: &V) -> ScenarioResult<()> {
        let type_name = std::any::type_name::<V>();
        let bcs_bytes = bcs::to_bytes(value).map_err(|e| ScenarioError::codec(type_name, e))?;
        let key = key.into();
        trace!(key = %key, type_name, "stash context value");
        self.entries.insert(
            key,
            StashedValue {
                type_name: type_name.to_string(),
                bcs_bytes,
            },
        );
        Ok(())
    }

    pub fn remove(&mut self, key: impl Into<EntryKey>) -> Option<StashedValue> {
        self.entries.remove(&key.into())
    }
}

/// Capability required to destroy a [`ContextStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextAdminCap {
    id: ObjectId,
    store: ObjectId,
}

impl ContextAdminCap {
    pub fn store_id(&self) -> ObjectId {
        self.store
    }
}

impl MoveObject for ContextAdminCap {
    fn type_tag() -> StructTag {
        StructTag {
            address: HARNESS_ADDRESS,
            module: ident_str!("context").to_owned(),
            name: ident_str!("ContextAdminCap").to_owned(),
            type_params: vec![],
        }
    }

    fn id(&self) -> ObjectId {
        self.id
    }
}

/// Handle to the shared context store.
#[derive(Clone)]
pub struct ContextStore {
    id: ObjectId,
    inner: Arc<RwLock<Option<ContextState>>>,
}

impl ContextStore {
    /// Create the store in the open transaction. The admin capability is a
    /// ledger object the caller should transfer to its administrator.
    pub fn create<R: LedgerRuntime>(scenario: &mut Scenario<R>) -> (Self, ContextAdminCap) {
        let id = scenario.new_uid();
        let cap = ContextAdminCap {
            id: scenario.new_uid(),
            store: id,
        };
        debug!(store = %address_to_string(&id), "create context store");
        let store = Self {
            id,
            inner: Arc::new(RwLock::new(Some(ContextState {
                id,
                entries: BTreeMap::new(),
            }))),
        };
        (store, cap)
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn borrow_state(&self) -> ScenarioResult<ContextStateRef<'_>> {
        RwLockReadGuard::try_map(self.inner.read(), |state| state.as_ref())
            .map_err(|_| ScenarioError::ContextDestroyed)
    }

    pub fn borrow_mut_state(&self) -> ScenarioResult<ContextStateMut<'_>> {
        RwLockWriteGuard::try_map(self.inner.write(), |state| state.as_mut())
            .map_err(|_| ScenarioError::ContextDestroyed)
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.read().is_none()
    }

    /// Destroy the store. Every handle observes the destruction.
    pub fn destroy(&self, cap: ContextAdminCap) -> ScenarioResult<()> {
        if cap.store != self.id {
            return Err(ScenarioError::InvalidAdminCap {
                expected: self.id,
                got: cap.store,
            });
        }
        let mut state = self.inner.write();
        if state.take().is_none() {
            return Err(ScenarioError::ContextDestroyed);
        }
        debug!(store = %address_to_string(&self.id), "destroy context store");
        Ok(())
    }
}

impl std::fmt::Debug for ContextStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextStore")
            .field("id", &address_to_string(&self.id))
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
