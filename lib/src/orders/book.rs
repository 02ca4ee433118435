use super::bids::Bid;
use crate::errors::AuctionError;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The ordered collection of active bids.
///
/// Bids are stored in an arena keyed by bidder and linked into a doubly linked list through
/// their `prev`/`next` keys. Walking from `head` to `tail` yields bids in strictly decreasing
/// priority.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidBook {
    bids: BTreeMap<Address, Bid>,
    head: Option<Address>,
    tail: Option<Address>,
}

impl BidBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a bid at its priority position.
    ///
    /// Scans from the head and stops at the first bid whose priority is not strictly higher
    /// than the new one, splicing the new bid immediately before it. Costs O(n) lookups.
    ///
    /// # Arguments
    ///
    /// * `self` - The book being inserted into.
    /// * `bid` - The bid to insert. Its `prev`/`next` links are overwritten.
    ///
    /// # Returns
    ///
    /// `AuctionError::DuplicateBid` if the bidder already has a bid in the book. The book is
    /// left untouched on error.
    pub fn insert(&mut self, mut bid: Bid) -> Result<(), AuctionError> {
        let key: Address = bid.bidder;
        if self.bids.contains_key(&key) {
            return Err(AuctionError::DuplicateBid(key));
        }

        // Find the first bid that does not outrank the new one
        let mut cursor: Option<Address> = self.head;
        while let Some(current) = cursor {
            let node: &Bid = self.node(&current)?;
            if !node.outranks(&bid) {
                break;
            }
            cursor = node.next;
        }

        // Resolve both neighbours before touching any link
        let prev: Option<Address> = match cursor {
            Some(next) => self.node(&next)?.prev,
            None => self.tail,
        };
        if let Some(prev) = prev {
            self.node(&prev)?;
        }

        bid.prev = prev;
        bid.next = cursor;
        match prev {
            Some(prev) => self.node_mut(&prev)?.next = Some(key),
            None => self.head = Some(key),
        }
        match cursor {
            Some(next) => self.node_mut(&next)?.prev = Some(key),
            None => self.tail = Some(key),
        }
        self.bids.insert(key, bid);

        Ok(())
    }

    /// Records the units settlement allocated to a bid and marks it filled.
    pub fn mark_filled(&mut self, bidder: &Address, allocated: U256) -> Result<(), AuctionError> {
        let bid: &mut Bid = self.node_mut(bidder)?;
        bid.allocated = allocated;
        bid.filled = true;
        Ok(())
    }

    pub fn get(&self, bidder: &Address) -> Option<&Bid> {
        self.bids.get(bidder)
    }

    pub fn contains(&self, bidder: &Address) -> bool {
        self.bids.contains_key(bidder)
    }

    pub fn head(&self) -> Option<Address> {
        self.head
    }

    pub fn tail(&self) -> Option<Address> {
        self.tail
    }

    pub fn len(&self) -> usize {
        self.bids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
    }

    /// Returns an iterator walking the book from head to tail.
    pub fn iter(&self) -> BookIter<'_> {
        BookIter {
            book: self,
            cursor: self.head,
        }
    }

    /// Sum of the quantities of every bid in the book.
    pub fn total_quantity(&self) -> U256 {
        self.bids
            .values()
            .fold(U256::ZERO, |acc: U256, bid: &Bid| acc.saturating_add(bid.quantity))
    }

    fn node(&self, key: &Address) -> Result<&Bid, AuctionError> {
        self.bids.get(key).ok_or(AuctionError::CorruptedBook(*key))
    }

    fn node_mut(&mut self, key: &Address) -> Result<&mut Bid, AuctionError> {
        self.bids.get_mut(key).ok_or(AuctionError::CorruptedBook(*key))
    }
}

/// Walks a `BidBook` from head to tail by repeated keyed lookup.
pub struct BookIter<'a> {
    book: &'a BidBook,
    cursor: Option<Address>,
}

impl<'a> Iterator for BookIter<'a> {
    type Item = &'a Bid;

    fn next(&mut self) -> Option<Self::Item> {
        let bid: &'a Bid = self.book.bids.get(&self.cursor?)?;
        self.cursor = bid.next;
        Some(bid)
    }
}
