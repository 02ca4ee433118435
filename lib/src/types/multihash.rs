use crate::errors::AuctionError;
use alloy_primitives::B256;
use alloy_sol_types::sol;
use serde::{Deserialize, Serialize};

/// Width of the packed encoding: digest (32) + hash function (1) + size (1).
pub const PACKED_MULTIHASH_LEN: usize = 34;

sol! {
    /// A `MultiHash` is a compact pointer to content stored off-engine. Only the algorithm
    /// identifier, the digest size and the raw digest are kept; the full self-describing
    /// address is rebuilt off-engine with `to_multihash_bytes`.
    #[derive(Serialize, Deserialize, PartialEq, Eq, Debug)]
    struct MultiHash {
        /// The raw digest, left-aligned
        bytes32 digest;
        /// The multihash code of the hashing algorithm
        uint8 hashFunction;
        /// The length of the digest in bytes
        uint8 size;
    }
}

impl MultiHash {
    /// Returns true if the pointer can reference real content: a non-zero digest produced by
    /// a declared algorithm with a non-empty size.
    pub fn is_valid(&self) -> bool {
        self.digest != B256::ZERO && self.hashFunction > 0 && self.size > 0
    }

    /// Encodes the pointer in its fixed-width packed form.
    pub fn encode(&self) -> [u8; PACKED_MULTIHASH_LEN] {
        let mut encoded = [0u8; PACKED_MULTIHASH_LEN];
        encoded[0..32].copy_from_slice(self.digest.as_slice());
        encoded[32] = self.hashFunction;
        encoded[33] = self.size;
        encoded
    }

    /// Decodes a pointer from its fixed-width packed form.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Exactly `PACKED_MULTIHASH_LEN` bytes as produced by `encode`.
    ///
    /// # Returns
    ///
    /// The decoded `MultiHash`, or `AuctionError::InvalidContentPointer` if the input has the
    /// wrong width or decodes to an invalid pointer.
    pub fn decode(bytes: &[u8]) -> Result<Self, AuctionError> {
        if bytes.len() != PACKED_MULTIHASH_LEN {
            return Err(AuctionError::InvalidContentPointer);
        }
        let pointer = Self {
            digest: B256::from_slice(&bytes[0..32]),
            hashFunction: bytes[32],
            size: bytes[33],
        };
        if !pointer.is_valid() {
            return Err(AuctionError::InvalidContentPointer);
        }
        Ok(pointer)
    }

    /// Rebuilds the variable-length `<hash function><size><digest>` address.
    pub fn to_multihash_bytes(&self) -> Vec<u8> {
        let digest_len = usize::from(self.size).min(32);
        let mut bytes = Vec::with_capacity(2 + digest_len);
        bytes.push(self.hashFunction);
        bytes.push(self.size);
        bytes.extend_from_slice(&self.digest[..digest_len]);
        bytes
    }
}
