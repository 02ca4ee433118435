//! Events emitted by accepted operations, in commit order.

use crate::types::multihash::MultiHash;
use alloy_primitives::{Address, B256, U256};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum AuctionEvent {
    AuctionStarted {
        auctioneer: Address,
        asset: Address,
        total_supply_for_sale: U256,
        start_time: u64,
        end_time: u64,
    },
    BidPlaced {
        bidder: Address,
        quantity: U256,
        price_per_token: U256,
        payment: U256,
    },
    ResultsSubmitted {
        root: B256,
        pointer: MultiHash,
        total_allocated: U256,
        verification_deadline: u64,
    },
    AuctionEnded {
        /// Payment forwarded to the auctioneer by the closing operation.
        proceeds: U256,
        /// Supply returned to the auctioneer because demand fell short.
        unsold: U256,
    },
    TokensClaimed {
        claimant: Address,
        quantity: U256,
    },
    RefundIssued {
        bidder: Address,
        amount: U256,
    },
    ResultsDisputed {
        watchdog: Address,
        previous_root: B256,
        root: B256,
        pointer: MultiHash,
        total_allocated: U256,
    },
    AuctioneerPenalized {
        auctioneer: Address,
        collateral: U256,
    },
}
