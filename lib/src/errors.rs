//! Auction engine error types.

use crate::state::AuctionStatus;
use alloy_primitives::{Address, U256};
use thiserror::Error;

/// Errors raised by the asset-ledger collaborator. Any of them aborts the enclosing
/// operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Insufficient balance of {asset} for {holder}: need {needed}, have {available}")]
    InsufficientBalance {
        asset: Address,
        holder: Address,
        needed: U256,
        available: U256,
    },

    #[error("Insufficient escrow of {asset}: need {needed}, hold {available}")]
    InsufficientEscrow {
        asset: Address,
        needed: U256,
        available: U256,
    },

    #[error("Transfer to {0} was rejected")]
    TransferRejected(Address),

    #[error("Balance overflow")]
    Overflow,
}

/// Errors that can occur while operating an auction. A failed operation never leaves a
/// visible effect behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuctionError {
    #[error("Invalid status. Expected: {expected:?}, Got: {got:?}")]
    InvalidStatus {
        expected: AuctionStatus,
        got: AuctionStatus,
    },

    #[error("Not authorized: {0}")]
    NotAuthorized(Address),

    #[error("Supply for sale must be positive")]
    ZeroSupply,

    #[error("Auction duration must be positive")]
    ZeroDuration,

    #[error("Bid quantity must be positive")]
    ZeroQuantity,

    #[error("Price {price} is below the minimum of {minimum}")]
    PriceBelowMinimum { minimum: U256, price: U256 },

    #[error("Payment mismatch: bid costs {expected}, got {provided}")]
    PaymentMismatch { expected: U256, provided: U256 },

    #[error("Already submitted bid: {0}")]
    DuplicateBid(Address),

    #[error("Bidding closed at {end_time}")]
    BiddingClosed { end_time: u64 },

    #[error("Auction has not ended: ends at {end_time}, now {now}")]
    AuctionNotEnded { end_time: u64, now: u64 },

    #[error("Verification window still open until {deadline}")]
    VerificationWindowOpen { deadline: u64 },

    #[error("Verification window closed at {deadline}")]
    VerificationWindowClosed { deadline: u64 },

    #[error("Watchdog {0} cannot police this auction")]
    InvalidWatchdog(Address),

    #[error("Result allocates {allocated} units out of a supply of {supply}")]
    AllocationExceedsSupply { allocated: U256, supply: U256 },

    #[error("Results already submitted")]
    ResultsAlreadySubmitted,

    #[error("Invalid result root")]
    InvalidRoot,

    #[error("Invalid content pointer")]
    InvalidContentPointer,

    #[error("Disputed result must differ from the committed one")]
    UnchangedResult,

    #[error("Results were already disputed")]
    AlreadyDisputed,

    #[error("No committed result to claim against")]
    NoCommittedResult,

    #[error("Invalid proof")]
    InvalidProof,

    #[error("Entry does not exist: {0}")]
    EntryNotFound(Address),

    #[error("Claim out of order. Expected serial {expected}, got {got}")]
    ClaimOutOfOrder { expected: u64, got: u64 },

    #[error("Claim of {claimed} exceeds the bid quantity of {bid}")]
    ClaimExceedsBid { claimed: U256, bid: U256 },

    #[error("Insufficient supply: {requested} requested, {remaining} remaining")]
    InsufficientSupply { requested: U256, remaining: U256 },

    #[error("Bid book is corrupted at {0}")]
    CorruptedBook(Address),

    #[error("Math overflow")]
    MathOverflow,

    #[error("Ledger transfer failed: {0}")]
    Ledger(#[from] LedgerError),
}

impl AuctionError {
    /// Returns true when the call was rejected only for being too early, so retrying it
    /// later can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AuctionError::AuctionNotEnded { .. } | AuctionError::VerificationWindowOpen { .. }
        )
    }
}
