use alloy_primitives::B256;
use tiny_keccak::{Hasher, Keccak};


/// Computes the Keccak-256 hash of the input bytes.
///
/// # Arguments
///
/// * `bytes` - A slice of bytes to be hashed.
///
/// # Returns
///
/// A 32-byte array containing the Keccak-256 hash.
pub fn keccak256(bytes: &[u8]) -> B256 {
    let mut hasher = Keccak::v256();
    hasher.update(bytes);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output.into()
}

/// Hashes two nodes in sorted order, so the result does not depend on which side each
/// node sits on.
///
/// # Arguments
///
/// * `hash_function` - A function that computes a 32-byte hash from a byte slice.
/// * `a` - One of the nodes.
/// * `b` - The other node.
pub fn hash_pair<F: Fn(&[u8]) -> B256>(hash_function: &F, a: &B256, b: &B256) -> B256 {
    if a <= b {
        hash_function(&[a.as_slice(), b.as_slice()].concat())
    } else {
        hash_function(&[b.as_slice(), a.as_slice()].concat())
    }
}
