//! A single-asset, uniform-priority supply auction.
//!
//! An auctioneer escrows a fixed supply and a collateral bond, bidders escrow exact payment
//! for `(quantity, price)` bids kept in priority order, and the auction closes either by
//! settling the book directly or by committing an off-engine result that bidders claim
//! against with Merkle proofs.
pub mod allocations;
pub mod auction;
pub mod auction_parameters;
pub mod constants;
pub mod errors;
pub mod events;
pub mod hashing;
pub mod ledger;
pub mod orders;
pub mod pricing;
pub mod state;
pub mod types;
pub mod utils;

pub use allocations::{allocate, Allocation, ResultSet};
pub use auction::{Auction, ClaimRequest};
pub use auction_parameters::{AuctionParameters, ClaimOrdering, PartialFillPolicy};
pub use errors::{AuctionError, LedgerError};
pub use events::AuctionEvent;
pub use ledger::{AssetLedger, InMemoryLedger};
pub use state::{AuctionState, AuctionStatus, CallContext, SettlementPath};
pub use types::multihash::MultiHash;
pub use utils::ClaimLeaf;
