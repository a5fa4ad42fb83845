//! Core object types.
//!
//! Objects are held by the runtime as BCS bytes plus a Move struct tag, the
//! same way the ledger stores them. Rust test code works with typed values
//! through the [`MoveObject`] trait and the scenario converts at the boundary.

use move_core_types::identifier::Identifier;
use move_core_types::language_storage::StructTag;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use sui_oracle_types::{Address, ObjectId};

use crate::errors::{ScenarioError, ScenarioResult};

/// Ownership of a ledger object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    /// Owned by a specific address
    Address(Address),
    /// Owned by another object (transferred to an object or wrapped as a child)
    Object(ObjectId),
    /// Shared object (can be accessed by anyone)
    Shared,
    /// Immutable (frozen, cannot be modified)
    Immutable,
}

/// A typed object with `key` ability: it has a type tag and carries its own ID.
///
/// Implementors must serialize the ID as part of their BCS layout, the way a
/// Move object embeds its `UID`.
pub trait MoveObject: Serialize + DeserializeOwned {
    /// Move struct tag of this object type.
    fn type_tag() -> StructTag;

    /// ID of this object.
    fn id(&self) -> ObjectId;
}

/// A typed event payload.
pub trait MoveEvent: Serialize {
    fn type_tag() -> StructTag;
}

/// An object as stored by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Object ID.
    pub id: ObjectId,

    /// Move type of the object.
    pub type_tag: StructTag,

    /// BCS-serialized object contents.
    pub bcs_bytes: Vec<u8>,

    /// Current owner.
    pub owner: Owner,

    /// Version number, bumped at every transaction that writes the object.
    pub version: u64,
}

impl StoredObject {
    /// Encode a typed value. The version is filled in by the runtime when the
    /// write is committed.
    pub fn from_value<T: MoveObject>(value: &T, owner: Owner) -> ScenarioResult<Self> {
        let bcs_bytes =
            bcs::to_bytes(value).map_err(|e| ScenarioError::codec(type_name(&T::type_tag()), e))?;
        Ok(Self {
            id: value.id(),
            type_tag: T::type_tag(),
            bcs_bytes,
            owner,
            version: 0,
        })
    }

    /// Decode the stored bytes as `T`.
    pub fn decode<T: MoveObject>(&self) -> ScenarioResult<T> {
        bcs::from_bytes(&self.bcs_bytes).map_err(|e| ScenarioError::codec(type_name(&self.type_tag), e))
    }
}

/// Build a struct tag for a non-generic type, validating the identifiers.
pub fn struct_tag(address: Address, module: &str, name: &str) -> anyhow::Result<StructTag> {
    Ok(StructTag {
        address,
        module: Identifier::new(module)?,
        name: Identifier::new(name)?,
        type_params: vec![],
    })
}

/// Display form of a struct tag used in errors and logs.
pub fn type_name(tag: &StructTag) -> String {
    tag.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use move_core_types::account_address::AccountAddress;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Flag {
        id: ObjectId,
        on: bool,
    }

    impl MoveObject for Flag {
        fn type_tag() -> StructTag {
            struct_tag(AccountAddress::TWO, "flag", "Flag").unwrap()
        }

        fn id(&self) -> ObjectId {
            self.id
        }
    }

    #[test]
    fn test_stored_object_round_trip() {
        let flag = Flag {
            id: AccountAddress::ONE,
            on: true,
        };
        let stored = StoredObject::from_value(&flag, Owner::Shared).unwrap();
        assert_eq!(stored.id, AccountAddress::ONE);
        assert_eq!(stored.bcs_bytes.len(), 33);
        assert_eq!(stored.decode::<Flag>().unwrap(), flag);
    }

    #[test]
    fn test_struct_tag_rejects_bad_identifier() {
        assert!(struct_tag(AccountAddress::TWO, "bad module", "X").is_err());
        assert!(struct_tag(AccountAddress::TWO, "m", "X").is_ok());
    }
}
