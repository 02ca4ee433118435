//! Auction state and the status machine gating every operation.

use crate::{
    auction_parameters::AuctionParameters, errors::AuctionError, orders::BidBook,
    types::multihash::MultiHash,
};
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle of an auction. Transitions only move forward and `Ended` is terminal:
///
/// `Inactive -> Active -> [ResultsSubmitted] -> Ended`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionStatus {
    Inactive,
    Active,
    ResultsSubmitted,
    Ended,
}

/// Which path closed the auction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementPath {
    /// The book was walked and settled on-engine.
    Direct,
    /// A committed result was published and bidders claim against it.
    Claims,
}

/// Context provided for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// Identity invoking the operation
    pub sender: Address,
    /// Current ledger time, in seconds
    pub timestamp: u64,
}

impl CallContext {
    pub fn new(sender: Address, timestamp: u64) -> Self {
        Self { sender, timestamp }
    }
}

/// The result root and content pointer committed for the claim path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedResult {
    pub root: B256,
    pub pointer: MultiHash,
    /// Units the result hands out across all its leaves; the rest of the supply is unsold
    pub total_allocated: U256,
}

/// Value the engine holds on behalf of participants.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowAccounts {
    /// Escrowed payment per bidder, removed once settled or claimed
    payments: BTreeMap<Address, U256>,
    /// Sum of all entries in `payments`
    total_payments: U256,
    /// Auctioneer collateral still held
    pub collateral: U256,
    /// Units of the asset for sale still held
    pub asset_held: U256,
}

impl EscrowAccounts {
    /// Records a bidder's escrowed payment.
    pub fn deposit(&mut self, bidder: &Address, amount: U256) -> Result<(), AuctionError> {
        let total = self
            .total_payments
            .checked_add(amount)
            .ok_or(AuctionError::MathOverflow)?;
        let entry = self.payments.entry(*bidder).or_default();
        *entry = entry.checked_add(amount).ok_or(AuctionError::MathOverflow)?;
        self.total_payments = total;
        Ok(())
    }

    /// Removes a bidder's entry and returns what it held.
    pub fn take(&mut self, bidder: &Address) -> Option<U256> {
        let amount = self.payments.remove(bidder)?;
        self.total_payments = self.total_payments.saturating_sub(amount);
        Some(amount)
    }

    pub fn payment_of(&self, bidder: &Address) -> Option<U256> {
        self.payments.get(bidder).copied()
    }

    pub fn total_payments(&self) -> U256 {
        self.total_payments
    }

    pub fn entries(&self) -> usize {
        self.payments.len()
    }
}

/// The single state record every operation reads and mutates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionState {
    pub status: AuctionStatus,
    pub auctioneer: Address,
    pub parameters: AuctionParameters,
    /// Asset being sold
    pub asset: Address,
    pub total_supply_for_sale: U256,
    pub start_time: u64,
    pub end_time: u64,
    pub verification_deadline: Option<u64>,
    pub book: BidBook,
    /// Number of bids ever accepted
    pub total_bid_count: u64,
    pub escrow: EscrowAccounts,
    pub committed: Option<CommittedResult>,
    /// Set once a dispute forfeited the auctioneer's collateral
    pub slashed: bool,
    pub settlement: Option<SettlementPath>,
    /// Supply not yet paid out to claimants
    pub remaining_claimable_supply: U256,
    /// Serial the next claim must carry under sequential ordering
    pub next_claim_serial: u64,
}

impl AuctionState {
    /// Creates an inactive auction owned by `auctioneer`.
    pub fn new(auctioneer: Address, parameters: AuctionParameters) -> Self {
        Self {
            status: AuctionStatus::Inactive,
            auctioneer,
            parameters,
            asset: Address::ZERO,
            total_supply_for_sale: U256::ZERO,
            start_time: 0,
            end_time: 0,
            verification_deadline: None,
            book: BidBook::new(),
            total_bid_count: 0,
            escrow: EscrowAccounts::default(),
            committed: None,
            slashed: false,
            settlement: None,
            remaining_claimable_supply: U256::ZERO,
            next_claim_serial: 0,
        }
    }

    /// Fails unless the auction currently is in the `expected` status.
    pub fn require_status(&self, expected: AuctionStatus) -> Result<(), AuctionError> {
        if self.status != expected {
            return Err(AuctionError::InvalidStatus {
                expected,
                got: self.status,
            });
        }
        Ok(())
    }

    pub fn require_auctioneer(&self, ctx: &CallContext) -> Result<(), AuctionError> {
        if ctx.sender != self.auctioneer {
            return Err(AuctionError::NotAuthorized(ctx.sender));
        }
        Ok(())
    }

    /// Fails with a "too early" error while the bidding period is running.
    pub fn require_ended(&self, ctx: &CallContext) -> Result<(), AuctionError> {
        if ctx.timestamp < self.end_time {
            return Err(AuctionError::AuctionNotEnded {
                end_time: self.end_time,
                now: ctx.timestamp,
            });
        }
        Ok(())
    }

    pub fn payment_asset(&self) -> Address {
        self.parameters.payment_asset
    }
}
