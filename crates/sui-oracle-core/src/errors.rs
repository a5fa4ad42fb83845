//! Scenario error types.
//!
//! Inventory-protocol errors mean the test code itself is wrong and stop the
//! current operation. Each variant carries a stable numeric code so drivers
//! can match on it the same way they match Move abort codes.
//!
//! Invariant violations are *not* errors; see [`crate::oracle`].

use sui_oracle_types::address::address_to_string;
use sui_oracle_types::ObjectId;

/// Effects could not be computed for the transaction.
pub const E_COULD_NOT_GENERATE_EFFECTS: u64 = 0;
/// A taken shared or immutable object was transferred, wrapped, mutated or deleted illegally.
pub const E_INVALID_SHARED_OR_IMMUTABLE_USAGE: u64 = 1;
/// Returned object was not taken through the tracked take path.
pub const E_CANT_RETURN_OBJECT: u64 = 2;
/// No eligible object of the requested type.
pub const E_EMPTY_INVENTORY: u64 = 3;
/// By-id take of an object that is not available.
pub const E_OBJECT_NOT_FOUND: u64 = 4;
/// Epoch number or epoch timestamp would overflow `u64`.
pub const E_EPOCH_OVERFLOW: u64 = 5;
pub const E_MISSING_CONTEXT_ENTRY: u64 = 10;
pub const E_CONTEXT_TYPE_MISMATCH: u64 = 11;
pub const E_CONTEXT_DESTROYED: u64 = 12;
pub const E_INVALID_ADMIN_CAP: u64 = 13;
pub const E_CODEC: u64 = 20;

pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// Structured error type for scenario, inventory and context store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioError {
    /// The runtime failed to compute effects for the open transaction.
    CouldNotGenerateEffects {
        /// Why effects could not be computed
        reason: String,
    },

    /// Shared/immutable ownership rules were broken by the transaction.
    InvalidSharedOrImmutableUsage {
        /// Offending objects
        object_ids: Vec<ObjectId>,
        /// First rule that was broken
        reason: String,
    },

    /// `return_*` of an object that was not taken through the matching take.
    CantReturnObject {
        object_id: ObjectId,
        /// Inventory the return targeted ("shared", "immutable", "address 0x..")
        inventory: String,
    },

    /// `take_*` found no available object of the requested type.
    EmptyInventory {
        type_tag: String,
        inventory: String,
    },

    /// `take_*_by_id` targeted an object that is not available.
    ObjectNotFound {
        object_id: ObjectId,
        type_tag: String,
        inventory: String,
    },

    /// Advancing the epoch would overflow the epoch number or timestamp.
    EpochOverflow {
        epoch: u64,
        epoch_timestamp_ms: u64,
        delta_ms: u64,
    },

    /// Context store lookup of a key nothing was stashed under.
    MissingContextEntry { key: String },

    /// Context store value was stashed as a different type.
    ContextTypeMismatch {
        key: String,
        expected: String,
        stored: String,
    },

    /// The context store was destroyed by its administrator.
    ContextDestroyed,

    /// Admin capability belongs to a different context store.
    InvalidAdminCap { expected: ObjectId, got: ObjectId },

    /// BCS encoding or decoding failed.
    Codec { what: String, message: String },
}

impl ScenarioError {
    /// Stable numeric code of this error.
    pub fn code(&self) -> u64 {
        match self {
            ScenarioError::CouldNotGenerateEffects { .. } => E_COULD_NOT_GENERATE_EFFECTS,
            ScenarioError::InvalidSharedOrImmutableUsage { .. } => {
                E_INVALID_SHARED_OR_IMMUTABLE_USAGE
            }
            ScenarioError::CantReturnObject { .. } => E_CANT_RETURN_OBJECT,
            ScenarioError::EmptyInventory { .. } => E_EMPTY_INVENTORY,
            ScenarioError::ObjectNotFound { .. } => E_OBJECT_NOT_FOUND,
            ScenarioError::EpochOverflow { .. } => E_EPOCH_OVERFLOW,
            ScenarioError::MissingContextEntry { .. } => E_MISSING_CONTEXT_ENTRY,
            ScenarioError::ContextTypeMismatch { .. } => E_CONTEXT_TYPE_MISMATCH,
            ScenarioError::ContextDestroyed => E_CONTEXT_DESTROYED,
            ScenarioError::InvalidAdminCap { .. } => E_INVALID_ADMIN_CAP,
            ScenarioError::Codec { .. } => E_CODEC,
        }
    }

    pub(crate) fn codec(what: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ScenarioError::Codec {
            what: what.into(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::CouldNotGenerateEffects { reason } => {
                write!(f, "CouldNotGenerateEffects: {}", reason)
            }
            ScenarioError::InvalidSharedOrImmutableUsage { object_ids, reason } => {
                write!(f, "InvalidSharedOrImmutableUsage: {}", reason)?;
                if !object_ids.is_empty() {
                    let ids: Vec<String> = object_ids.iter().map(address_to_string).collect();
                    write!(f, " [objects: {}]", ids.join(", "))?;
                }
                Ok(())
            }
            ScenarioError::CantReturnObject {
                object_id,
                inventory,
            } => write!(
                f,
                "CantReturnObject: {} was not taken from the {} inventory",
                address_to_string(object_id),
                inventory
            ),
            ScenarioError::EmptyInventory {
                type_tag,
                inventory,
            } => write!(
                f,
                "EmptyInventory: no available {} in the {} inventory",
                type_tag, inventory
            ),
            ScenarioError::ObjectNotFound {
                object_id,
                type_tag,
                inventory,
            } => write!(
                f,
                "ObjectNotFound: {} (expected type: {}) is not available in the {} inventory",
                address_to_string(object_id),
                type_tag,
                inventory
            ),
            ScenarioError::EpochOverflow {
                epoch,
                epoch_timestamp_ms,
                delta_ms,
            } => write!(
                f,
                "EpochOverflow: cannot advance epoch {} at {}ms by {}ms",
                epoch, epoch_timestamp_ms, delta_ms
            ),
            ScenarioError::MissingContextEntry { key } => {
                write!(f, "MissingContextEntry: nothing stashed under {}", key)
            }
            ScenarioError::ContextTypeMismatch {
                key,
                expected,
                stored,
            } => write!(
                f,
                "ContextTypeMismatch at {}: expected {}, stored {}",
                key, expected, stored
            ),
            ScenarioError::ContextDestroyed => write!(f, "ContextDestroyed"),
            ScenarioError::InvalidAdminCap { expected, got } => write!(
                f,
                "InvalidAdminCap: capability for {} used on {}",
                address_to_string(got),
                address_to_string(expected)
            ),
            ScenarioError::Codec { what, message } => {
                write!(f, "Codec error ({}): {}", what, message)
            }
        }
    }
}

impl std::error::Error for ScenarioError {}
