use crate::hashing::{hash_pair, keccak256};
use crate::utils::{verify_proof, ClaimLeaf};
use alloy_primitives::{keccak256 as alloy_keccak256, Address, B256, U256};
use alloy_sol_types::SolValue;
use claim_tree::ClaimTree;

#[test]
fn test_claim_leaf_encoding() {
    let leaf = random_claim_leaf();
    let encoded: Vec<u8> = leaf.abi_encode();

    // Three full words: padded address, padded serial, quantity
    assert_eq!(encoded.len(), 96);
    assert_eq!(&encoded[0..12], &[0u8; 12]);
    assert_eq!(&encoded[12..32], leaf.claimant.as_slice());
    assert_eq!(&encoded[32..64], &U256::from(leaf.serial).to_be_bytes::<32>());
    assert_eq!(&encoded[64..96], &leaf.quantity.to_be_bytes::<32>());
}

#[test]
fn test_claim_leaf_hash() {
    let leaf = random_claim_leaf();
    let expected: B256 = alloy_keccak256(alloy_keccak256(leaf.abi_encode()));

    assert_eq!(leaf.hash(&keccak256), expected);
    assert_eq!(leaf.hash(&|x: &[u8]| alloy_keccak256(x)), expected);
}

#[test]
fn test_claim_leaf_hash_binds_every_field() {
    let leaf = random_claim_leaf();
    let hash = leaf.hash(&keccak256);

    let mut other = leaf.clone();
    other.quantity += U256::from(1);
    assert_ne!(other.hash(&keccak256), hash);

    let mut other = leaf.clone();
    other.serial += 1;
    assert_ne!(other.hash(&keccak256), hash);

    let mut other = leaf;
    other.claimant = Address::random();
    assert_ne!(other.hash(&keccak256), hash);
}

#[test]
fn test_verify_proof_against_claim_tree() {
    let leaves: Vec<B256> = (0..13)
        .map(|serial| ClaimLeaf::new(Address::random(), serial, U256::from(serial * 7)))
        .map(|leaf| leaf.hash(&keccak256))
        .collect();
    let tree = ClaimTree::new(&leaves);

    for (index, leaf) in leaves.iter().enumerate() {
        let proof = tree.generate_proof(index).unwrap();
        assert!(verify_proof(&keccak256, &tree.root(), leaf, &proof.siblings));
    }
}

#[test]
fn test_verify_proof_rejects_tampering() {
    let leaves: Vec<B256> = (0..8).map(|_| B256::random()).collect();
    let tree = ClaimTree::new(&leaves);
    let proof = tree.generate_proof(3).unwrap();

    // Wrong leaf
    assert!(!verify_proof(&keccak256, &tree.root(), &leaves[4], &proof.siblings));
    // Wrong root
    assert!(!verify_proof(&keccak256, &B256::random(), &leaves[3], &proof.siblings));
    // Truncated proof
    assert!(!verify_proof(
        &keccak256,
        &tree.root(),
        &leaves[3],
        &proof.siblings[1..]
    ));
}

#[test]
fn test_single_leaf_tree() {
    let leaf: B256 = B256::random();
    // With one leaf the root is the leaf and the proof is empty
    assert!(verify_proof(&keccak256, &leaf, &leaf, &[]));

    let sibling: B256 = B256::random();
    let root = hash_pair(&keccak256, &leaf, &sibling);
    assert!(verify_proof(&keccak256, &root, &leaf, &[sibling]));
    assert!(verify_proof(&keccak256, &root, &sibling, &[leaf]));
}

// HELPER FUNCTIONS
fn random_claim_leaf() -> ClaimLeaf {
    ClaimLeaf::new(
        Address::random(),
        rand::random::<u32>() as u64,
        U256::from(rand::random::<u128>()),
    )
}
