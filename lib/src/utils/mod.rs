use crate::hashing::hash_pair;
use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, SolValue};
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

sol! {
    /// A `ClaimLeaf` is one entry of a committed auction result: `claimant` may claim
    /// `quantity` units, and is paid in `serial` order when ordering is enforced.
    #[derive(Serialize, Deserialize, PartialEq, Eq, Debug)]
    struct ClaimLeaf {
        /// The identity entitled to the claim
        address claimant;
        /// Position of the claim in the payout order
        uint64 serial;
        /// Units of the asset to pay out, zero for a refund
        uint256 quantity;
    }
}

impl ClaimLeaf {
    pub fn new(claimant: Address, serial: u64, quantity: U256) -> Self {
        Self {
            claimant,
            serial,
            quantity,
        }
    }

    /// Computes the leaf hash: `hash(hash(abi.encode(claimant, serial, quantity)))`.
    ///
    /// Every field is encoded as a full 32-byte word. Hashing twice keeps a leaf from ever
    /// being mistaken for an inner node of the tree.
    ///
    /// # Arguments
    ///
    /// * `self` - The leaf being hashed.
    /// * `hash_function` - A function that computes a 32-byte hash from a byte slice.
    pub fn hash<F: Fn(&[u8]) -> B256>(&self, hash_function: &F) -> B256 {
        let inner: B256 = hash_function(&self.abi_encode());
        hash_function(inner.as_slice())
    }
}

/// Verifies that `leaf` belongs to the tree with the given `root`.
///
/// The proof lists sibling hashes from the leaf level upwards. Each pair is hashed in sorted
/// order, so no position bits are needed.
///
/// # Arguments
///
/// * `hash_function` - A function that computes a 32-byte hash from a byte slice.
/// * `root` - The committed root.
/// * `leaf` - The leaf hash being proven.
/// * `proof` - The sibling hashes on the path from the leaf to the root.
///
/// # Returns
///
/// `true` if folding the proof over the leaf reproduces `root`.
pub fn verify_proof<F: Fn(&[u8]) -> B256>(
    hash_function: &F,
    root: &B256,
    leaf: &B256,
    proof: &[B256],
) -> bool {
    let computed: B256 = proof
        .iter()
        .fold(*leaf, |node: B256, sibling: &B256| {
            hash_pair(hash_function, &node, sibling)
        });
    computed == *root
}
