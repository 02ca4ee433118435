use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};

/// Represents a bid to buy `quantity` units of the asset for sale at `price_per_token`.
///
/// Bids live in the `BidBook` arena, keyed by bidder, and are linked to their neighbours by
/// key rather than by reference.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
    /// Address of the bidder, also the bid's key in the book.
    pub bidder: Address,
    /// Number of asset units bid for.
    pub quantity: U256,
    /// Price of one unit, scaled by `PRICE_SCALE`.
    pub price_per_token: U256,
    /// Time the bid was accepted.
    pub submitted_at: u64,
    /// Insertion order, breaks ties between bids accepted at the same time.
    pub sequence: u64,
    /// Set by settlement once the bid received an allocation.
    pub filled: bool,
    /// Units credited to the bid by settlement.
    pub allocated: U256,
    /// Key of the next higher-priority bid, `None` at the head.
    pub prev: Option<Address>,
    /// Key of the next lower-priority bid, `None` at the tail.
    pub next: Option<Address>,
}

/// Ordering key of a bid: price desc, quantity desc, submission time asc, sequence asc.
pub type PriorityKey = (U256, U256, Reverse<u64>, Reverse<u64>);

impl Bid {
    /// Creates an unlinked, unfilled bid.
    pub fn new(
        bidder: Address,
        quantity: U256,
        price_per_token: U256,
        submitted_at: u64,
        sequence: u64,
    ) -> Self {
        Self {
            bidder,
            quantity,
            price_per_token,
            submitted_at,
            sequence,
            filled: false,
            allocated: U256::ZERO,
            prev: None,
            next: None,
        }
    }

    /// Returns the bid's priority key. A greater key sits closer to the head of the book.
    pub fn priority_key(&self) -> PriorityKey {
        (
            self.price_per_token,
            self.quantity,
            Reverse(self.submitted_at),
            Reverse(self.sequence),
        )
    }

    /// Returns true if this bid must be settled strictly before `other`.
    pub fn outranks(&self, other: &Bid) -> bool {
        self.cmp_priority(other) == Ordering::Greater
    }

    pub fn cmp_priority(&self, other: &Bid) -> Ordering {
        self.priority_key().cmp(&other.priority_key())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_higher_price_outranks() {
        let cheap = Bid::new(Address::random(), U256::from(100), U256::from(2), 0, 0);
        let rich = Bid::new(Address::random(), U256::from(1), U256::from(3), 10, 1);
        assert!(rich.outranks(&cheap));
        assert!(!cheap.outranks(&rich));
    }

    #[test]
    fn test_larger_quantity_breaks_price_tie() {
        let small = Bid::new(Address::random(), U256::from(20), U256::from(3), 0, 0);
        let large = Bid::new(Address::random(), U256::from(30), U256::from(3), 5, 1);
        assert!(large.outranks(&small));
    }

    #[test]
    fn test_earlier_submission_breaks_full_tie() {
        let early = Bid::new(Address::random(), U256::from(20), U256::from(3), 1, 0);
        let late = Bid::new(Address::random(), U256::from(20), U256::from(3), 2, 1);
        assert!(early.outranks(&late));

        // Same second, insertion order decides
        let first = Bid::new(Address::random(), U256::from(20), U256::from(3), 7, 4);
        let second = Bid::new(Address::random(), U256::from(20), U256::from(3), 7, 5);
        assert!(first.outranks(&second));
        assert!(!second.outranks(&first));
    }

    // HELPER FUNCTIONS
    /// Creates a random unlinked bid.
    pub fn random_bid() -> Bid {
        Bid::new(
            Address::random(),
            U256::from(rand::random::<u16>() as u64 + 1),
            U256::from(rand::random::<u8>() as u64 % 8 + 1),
            rand::random::<u8>() as u64,
            rand::random::<u32>() as u64,
        )
    }
}
