//! The allocation walk shared by on-engine settlement and off-engine result building.

use crate::{
    constants::{KECCAK_256_DIGEST_SIZE, KECCAK_256_MULTIHASH_CODE},
    orders::{Bid, BidBook},
    types::multihash::MultiHash,
    utils::ClaimLeaf,
};
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// Units assigned to one bid by the allocation walk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub bidder: Address,
    /// Position of the bid in the book, head first
    pub serial: u64,
    /// Units the bid receives, zero when the supply ran out before it
    pub quantity: U256,
    /// Units the bid asked for
    pub requested: U256,
    pub price_per_token: U256,
}

impl Allocation {
    pub fn is_winning(&self) -> bool {
        !self.quantity.is_zero()
    }

    pub fn is_partial(&self) -> bool {
        self.is_winning() && self.quantity < self.requested
    }
}

/// Walks the book from head to tail, giving each bid `min(quantity, remaining)` units until
/// `supply` runs out. Later bids get zero.
///
/// # Arguments
///
/// * `book` - The bid book to walk.
/// * `supply` - Units available for sale.
///
/// # Returns
///
/// One `Allocation` per bid, in book order.
pub fn allocate(book: &BidBook, supply: U256) -> Vec<Allocation> {
    let mut remaining: U256 = supply;
    book.iter()
        .enumerate()
        .map(|(serial, bid): (usize, &Bid)| {
            let quantity: U256 = bid.quantity.min(remaining);
            remaining -= quantity;
            Allocation {
                bidder: bid.bidder,
                serial: serial as u64,
                quantity,
                requested: bid.quantity,
                price_per_token: bid.price_per_token,
            }
        })
        .collect()
}

/// The full result of an auction as published off-engine: one claim entry per bid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    pub total_supply_for_sale: U256,
    pub allocations: Vec<Allocation>,
}

impl ResultSet {
    /// Computes the honest result for a closed book.
    pub fn from_book(book: &BidBook, supply: U256) -> Self {
        Self {
            total_supply_for_sale: supply,
            allocations: allocate(book, supply),
        }
    }

    /// Returns the claim leaves of the result, in serial order.
    pub fn claim_leaves(&self) -> Vec<ClaimLeaf> {
        self.allocations
            .iter()
            .map(|allocation: &Allocation| {
                ClaimLeaf::new(allocation.bidder, allocation.serial, allocation.quantity)
            })
            .collect()
    }

    /// Returns the hashed claim leaves, ready to be inserted into a tree.
    pub fn leaf_hashes<F: Fn(&[u8]) -> B256>(&self, hash_function: &F) -> Vec<B256> {
        self.claim_leaves()
            .iter()
            .map(|leaf: &ClaimLeaf| leaf.hash(hash_function))
            .collect()
    }

    /// Units the result hands out in total.
    pub fn total_allocated(&self) -> U256 {
        self.allocations
            .iter()
            .fold(U256::ZERO, |acc: U256, allocation: &Allocation| {
                acc + allocation.quantity
            })
    }

    /// Serializes the result as published to the content index.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }

    /// Computes the content pointer of the serialized result.
    pub fn content_pointer<F: Fn(&[u8]) -> B256>(
        &self,
        hash_function: &F,
    ) -> Result<MultiHash, bincode::Error> {
        Ok(MultiHash {
            digest: hash_function(&self.to_bytes()?),
            hashFunction: KECCAK_256_MULTIHASH_CODE,
            size: KECCAK_256_DIGEST_SIZE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hashing::keccak256, orders::bids::tests::random_bid};

    fn book_of(bids: &[(u64, u64)]) -> (BidBook, Vec<Address>) {
        let mut book = BidBook::new();
        let mut bidders = Vec::new();
        for (sequence, (quantity, price)) in bids.iter().enumerate() {
            let bid = Bid::new(
                Address::random(),
                U256::from(*quantity),
                U256::from(*price),
                sequence as u64,
                sequence as u64,
            );
            bidders.push(bid.bidder);
            book.insert(bid).unwrap();
        }
        (book, bidders)
    }

    #[test]
    fn test_allocate_partial_fill() {
        let (book, bidders) = book_of(&[(20, 3), (30, 3), (60, 2)]);
        let allocations = allocate(&book, U256::from(100));

        let summary: Vec<(Address, U256)> = allocations
            .iter()
            .map(|a| (a.bidder, a.quantity))
            .collect();
        assert_eq!(
            summary,
            vec![
                (bidders[1], U256::from(30)),
                (bidders[0], U256::from(20)),
                (bidders[2], U256::from(50)),
            ]
        );
        assert!(allocations[2].is_partial());
        assert!(!allocations[0].is_partial());
        assert_eq!(
            allocations.iter().map(|a| a.serial).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_allocate_exact_exhaustion_and_losers() {
        let (book, _) = book_of(&[(40, 5), (60, 4), (10, 1)]);
        let allocations = allocate(&book, U256::from(100));

        assert_eq!(allocations[1].quantity, U256::from(60));
        assert!(!allocations[1].is_partial());
        assert!(!allocations[2].is_winning());
    }

    #[test]
    fn test_allocate_empty_book() {
        assert!(allocate(&BidBook::new(), U256::from(100)).is_empty());
    }

    #[test]
    fn test_allocation_conservation() {
        for _ in 0..16 {
            let mut book = BidBook::new();
            for _ in 0..50 {
                book.insert(random_bid()).unwrap();
            }
            let supply = U256::from(rand::random::<u32>() as u64 % 3_000_000);
            let result = ResultSet::from_book(&book, supply);

            let allocated = result.total_allocated();
            assert!(allocated <= supply);
            assert_eq!(allocated, supply.min(book.total_quantity()));
        }
    }

    #[test]
    fn test_result_set_bytes_and_pointer() {
        let (book, _) = book_of(&[(20, 3), (30, 3), (60, 2)]);
        let result = ResultSet::from_book(&book, U256::from(100));

        let bytes = result.to_bytes().unwrap();
        assert_eq!(ResultSet::from_bytes(&bytes).unwrap(), result);

        let pointer = result.content_pointer(&keccak256).unwrap();
        assert!(pointer.is_valid());
        assert_eq!(pointer.digest, keccak256(&bytes));
        assert_eq!(pointer.hashFunction, KECCAK_256_MULTIHASH_CODE);
    }

    #[test]
    fn test_leaf_hashes_follow_serials() {
        let (book, _) = book_of(&[(20, 3), (30, 3)]);
        let result = ResultSet::from_book(&book, U256::from(25));
        let hashes = result.leaf_hashes(&keccak256);

        assert_eq!(hashes.len(), 2);
        let leaves = result.claim_leaves();
        assert_eq!(leaves[0].serial, 0);
        assert_eq!(leaves[0].quantity, U256::from(25));
        assert_eq!(leaves[1].quantity, U256::ZERO);
        assert_eq!(hashes[1], leaves[1].hash(&keccak256));
    }
}
