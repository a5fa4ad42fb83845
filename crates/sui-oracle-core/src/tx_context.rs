//! Deterministic transaction context.
//!
//! A `TxContext` is a pure function of `(sender, tx_seed, epoch,
//! epoch_timestamp_ms, ids_created)`. The scenario derives the seed from the
//! transaction number, so every transaction of a scenario has a distinct
//! digest and therefore mints object IDs that never collide with earlier ones.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use sui_oracle_types::{AccountAddress, Address, ObjectId};

/// Minimum length of a transaction digest. Shorter seeds are zero-padded.
pub const TX_HASH_LENGTH: usize = 32;

/// Domain separator for object ID derivation.
const OBJECT_ID_SCOPE: u8 = 0xf1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxContext {
    sender: Address,
    tx_hash: Vec<u8>,
    epoch: u64,
    epoch_timestamp_ms: u64,
    ids_created: u64,
}

impl TxContext {
    /// Construct a context. `tx_seed` is zero-padded up to [`TX_HASH_LENGTH`];
    /// longer seeds are kept as they are.
    pub fn new(
        sender: Address,
        tx_seed: &[u8],
        epoch: u64,
        epoch_timestamp_ms: u64,
        ids_created: u64,
    ) -> Self {
        let mut tx_hash = tx_seed.to_vec();
        if tx_hash.len() < TX_HASH_LENGTH {
            tx_hash.resize(TX_HASH_LENGTH, 0);
        }
        Self {
            sender,
            tx_hash,
            epoch,
            epoch_timestamp_ms,
            ids_created,
        }
    }

    /// Construct a context whose seed is the BCS encoding of `hint`.
    pub fn from_hint(
        sender: Address,
        hint: u64,
        epoch: u64,
        epoch_timestamp_ms: u64,
        ids_created: u64,
    ) -> Self {
        // BCS encodes a u64 as its 8 little-endian bytes.
        Self::new(
            sender,
            &hint.to_le_bytes(),
            epoch,
            epoch_timestamp_ms,
            ids_created,
        )
    }

    pub fn sender(&self) -> Address {
        self.sender
    }

    pub fn digest(&self) -> &[u8] {
        &self.tx_hash
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn epoch_timestamp_ms(&self) -> u64 {
        self.epoch_timestamp_ms
    }

    pub fn ids_created(&self) -> u64 {
        self.ids_created
    }

    /// Mint the next object ID of this transaction.
    pub fn fresh_id(&mut self) -> ObjectId {
        let id = derive_id(&self.tx_hash, self.ids_created);
        self.ids_created += 1;
        id
    }
}

/// Object ID for the `creation_num`-th object minted by transaction `tx_hash`.
pub fn derive_id(tx_hash: &[u8], creation_num: u64) -> ObjectId {
    let mut hasher = Sha256::new();
    hasher.update([OBJECT_ID_SCOPE]);
    hasher.update(tx_hash);
    hasher.update(creation_num.to_le_bytes());
    let digest: [u8; 32] = hasher.finalize().into();
    AccountAddress::new(digest)
}
