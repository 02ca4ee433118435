//! Builds the tree committed for an auction result and the per-claimant proofs checked
//! against it.
//!
//! The layout follows a lean incremental Merkle tree ([Semaphore's
//! implementation](https://hackmd.io/@vplasencia/S1whLBN16)): a node without a right sibling is
//! carried up unchanged instead of being paired with a zero value. Pairs are hashed in sorted
//! order, so proofs carry sibling hashes only.
use alloy_primitives::{keccak256, B256};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimTreeError {
    #[error("The leaf at index '{0}' does not exist in this tree")]
    LeafNotFound(usize),
}

/// An append-only Merkle tree over claim leaves.
///
/// It stores nodes at each level of the tree, allowing for efficient updates and proof
/// generation.
#[derive(Clone, Debug)]
pub struct ClaimTree {
    /// Stores the nodes of the tree. Each inner `Vec` represents a level in the tree.
    /// The first `Vec` (index 0) contains the leaves, and the last `Vec` contains the root.
    nodes: Vec<Vec<B256>>,
}

impl Default for ClaimTree {
    /// Creates a new, empty `ClaimTree`.
    fn default() -> Self {
        Self::new(&[])
    }
}

/// A Merkle proof for one leaf of a `ClaimTree`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimProof {
    /// The root hash of the Merkle tree.
    pub root: B256,
    /// The leaf hash for which the proof is generated.
    pub leaf: B256,
    /// The index of the leaf in the tree.
    pub index: usize,
    /// The sibling hashes needed to reconstruct the path to the root, leaf level first.
    pub siblings: Vec<B256>,
}

/// Hashes two nodes in sorted order.
pub fn hash_pair(a: &B256, b: &B256) -> B256 {
    if a <= b {
        keccak256([a.as_slice(), b.as_slice()].concat())
    } else {
        keccak256([b.as_slice(), a.as_slice()].concat())
    }
}

impl ClaimTree {
    /// Create a new tree containing the provided `leaves`
    ///
    /// # Arguments
    ///
    /// * `leaves` - A vector of leaf hashes to initialize the tree with.
    pub fn new(leaves: &[B256]) -> Self {
        let mut tree: ClaimTree = Self {
            nodes: vec![vec![]],
        };
        if !leaves.is_empty() {
            tree.insert_many(leaves);
        }
        tree
    }

    /// Returns the root hash of the Merkle tree.
    ///
    /// If the tree is empty, returns a zero `B256` value.
    pub fn root(&self) -> B256 {
        self.nodes[self.depth()]
            .first()
            .copied()
            .unwrap_or(B256::ZERO)
    }

    /// Returns the depth of the Merkle tree, excluding the leaf level.
    pub fn depth(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn leaves(&self) -> &[B256] {
        &self.nodes[0]
    }

    /// Returns the number of leaves.
    pub fn size(&self) -> usize {
        self.nodes[0].len()
    }

    /// Finds the index of a given `leaf` in the Merkle tree.
    pub fn index_of(&self, leaf: &B256) -> Option<usize> {
        self.nodes[0].iter().position(|x| x == leaf)
    }

    /// Appends leaves to the tree, recomputing only the nodes on their paths.
    ///
    /// # Arguments
    ///
    /// * `leaves` - A vector of leaf hashes to insert into the tree.
    pub fn insert_many(&mut self, leaves: &[B256]) {
        let mut start_index: usize = self.size() >> 1;
        self.nodes[0].extend_from_slice(leaves);

        let mut required_depth: usize = 0;
        while (1usize << required_depth) < self.size() {
            required_depth += 1;
        }
        let new_levels: usize = required_depth.saturating_sub(self.depth());
        self.nodes.extend((0..new_levels).map(|_| vec![]));

        for level in 0..self.depth() {
            let num_nodes: usize = (self.nodes[level].len() + 1) / 2;

            for index in start_index..num_nodes {
                let left_node: B256 = self.nodes[level][index * 2];
                let parent_node: B256 = match self.nodes[level].get(index * 2 + 1) {
                    Some(right_node) => hash_pair(&left_node, right_node),
                    None => left_node,
                };

                if index >= self.nodes[level + 1].len() {
                    self.nodes[level + 1].push(parent_node);
                } else {
                    self.nodes[level + 1][index] = parent_node;
                }
            }

            start_index >>= 1;
        }
    }

    /// Generates a `ClaimProof` for the leaf at the given `index`.
    ///
    /// # Returns
    ///
    /// The proof, or `ClaimTreeError::LeafNotFound` if the index is out of bounds.
    pub fn generate_proof(&self, index: usize) -> Result<ClaimProof, ClaimTreeError> {
        if index >= self.size() {
            return Err(ClaimTreeError::LeafNotFound(index));
        }

        let mut siblings: Vec<B256> = Vec::new();
        let mut current_index: usize = index;

        for level in 0..self.depth() {
            let sibling_index: usize = current_index ^ 1;
            // A node carried up without a sibling contributes nothing to the path
            if let Some(sibling) = self.nodes[level].get(sibling_index) {
                siblings.push(*sibling);
            }
            current_index >>= 1;
        }

        Ok(ClaimProof {
            root: self.root(),
            leaf: self.nodes[0][index],
            index,
            siblings,
        })
    }

    /// Verifies a `ClaimProof` against the root it carries.
    ///
    /// The method **does not** check the proof against the *current* tree.
    pub fn verify_proof(proof: &ClaimProof) -> bool {
        let node: B256 = proof
            .siblings
            .iter()
            .fold(proof.leaf, |node, sibling| hash_pair(&node, sibling));
        proof.root == node
    }
}

#[cfg(test)]
mod test {
    use super::{hash_pair, ClaimTree, ClaimTreeError};
    use alloy_primitives::B256;

    #[test]
    fn test_initializes_empty_tree() {
        let tree: ClaimTree = ClaimTree::new(&[]);
        assert_eq!(tree.root(), B256::default());
        assert_eq!(tree.size(), 0);
    }

    #[test]
    fn test_initializes_tree_with_leaves() {
        let leaves: Vec<B256> = (0..5).map(|_| B256::random()).collect();
        let tree: ClaimTree = ClaimTree::new(&leaves);

        let manual_root: B256 = {
            let left_node = hash_pair(
                &hash_pair(&leaves[0], &leaves[1]),
                &hash_pair(&leaves[2], &leaves[3]),
            );
            hash_pair(&left_node, &leaves[4])
        };

        assert_eq!(tree.root(), manual_root);
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn test_single_leaf_root_is_leaf() {
        let leaf = B256::random();
        let tree = ClaimTree::new(&[leaf]);
        assert_eq!(tree.root(), leaf);
        assert!(tree.generate_proof(0).unwrap().siblings.is_empty());
    }

    #[test]
    fn test_incremental_inserts_match_bulk_build() {
        let leaves: Vec<B256> = (0..37).map(|_| B256::random()).collect();
        let mut tree = ClaimTree::new(&leaves[..10]);
        tree.insert_many(&leaves[10..11]);
        tree.insert_many(&leaves[11..]);

        assert_eq!(tree.root(), ClaimTree::new(&leaves).root());
    }

    #[test]
    fn test_leaves_and_index_of() {
        let leaves: Vec<B256> = (0..rand::random::<u8>() as usize + 1)
            .map(|_| B256::random())
            .collect();
        let tree: ClaimTree = ClaimTree::new(&leaves);

        assert_eq!(tree.leaves(), leaves.as_slice());
        let index = rand::random::<usize>() % leaves.len();
        assert_eq!(tree.index_of(&leaves[index]), Some(index));
        assert_eq!(tree.index_of(&B256::random()), None);
    }

    #[test]
    fn test_generate_verify_proof() {
        let size: usize = rand::random::<u8>() as usize + 1;
        let leaves: Vec<B256> = (0..size).map(|_| B256::random()).collect();
        let tree: ClaimTree = ClaimTree::new(&leaves);

        for index in 0..size {
            let proof = tree.generate_proof(index).unwrap();
            assert_eq!(proof.leaf, leaves[index]);
            assert!(ClaimTree::verify_proof(&proof));
        }
    }

    #[test]
    fn test_tampered_proof_fails() {
        let leaves: Vec<B256> = (0..9).map(|_| B256::random()).collect();
        let tree: ClaimTree = ClaimTree::new(&leaves);
        let mut proof = tree.generate_proof(4).unwrap();
        proof.leaf = B256::random();
        assert!(!ClaimTree::verify_proof(&proof));
    }

    #[test]
    fn test_out_of_bounds_proof() {
        let tree: ClaimTree = ClaimTree::new(&[B256::random()]);
        assert_eq!(
            tree.generate_proof(1),
            Err(ClaimTreeError::LeafNotFound(1))
        );
    }
}
