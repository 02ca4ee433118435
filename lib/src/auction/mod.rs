//! The auction engine: every operation runs against a shadow copy of the state, the ledger
//! and the event log, and the copies replace the live ones only when the operation succeeds.

pub mod claims;
pub mod lifecycle;
pub mod settlement;


pub use claims::ClaimRequest;

use crate::{
    allocations::ResultSet,
    auction_parameters::AuctionParameters,
    errors::AuctionError,
    events::AuctionEvent,
    ledger::AssetLedger,
    state::{AuctionState, AuctionStatus, CallContext},
    types::multihash::MultiHash,
};
use alloy_primitives::{Address, B256, U256};

/// A single auction together with the ledger it settles through.
#[derive(Clone, Debug)]
pub struct Auction<L: AssetLedger + Clone> {
    state: AuctionState,
    ledger: L,
    events: Vec<AuctionEvent>,
}

impl<L: AssetLedger + Clone> Auction<L> {
    /// Creates an inactive auction owned by `auctioneer`.
    pub fn new(auctioneer: Address, parameters: AuctionParameters, ledger: L) -> Self {
        Self {
            state: AuctionState::new(auctioneer, parameters),
            ledger,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &AuctionState {
        &self.state
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mutable access to the ledger, for funding participants between operations.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// Every event emitted so far, in commit order.
    pub fn events(&self) -> &[AuctionEvent] {
        &self.events
    }

    /// The honest result for the current book, as the auctioneer would publish it.
    pub fn result_set(&self) -> ResultSet {
        ResultSet::from_book(&self.state.book, self.state.total_supply_for_sale)
    }

    pub fn start(
        &mut self,
        ctx: &CallContext,
        asset: Address,
        supply: U256,
        duration: u64,
    ) -> Result<(), AuctionError> {
        self.transact(ctx, |state, ledger, ctx, events| {
            lifecycle::start(state, ledger, ctx, events, asset, supply, duration)
        })
    }

    pub fn place_bid(
        &mut self,
        ctx: &CallContext,
        quantity: U256,
        price_per_token: U256,
        payment: U256,
    ) -> Result<(), AuctionError> {
        self.transact(ctx, |state, ledger, ctx, events| {
            lifecycle::place_bid(state, ledger, ctx, events, quantity, price_per_token, payment)
        })
    }

    /// Closes the auction along whichever path it is on: an `Active` auction is settled
    /// directly, a `ResultsSubmitted` one ends and opens claims.
    pub fn finalize(&mut self, ctx: &CallContext) -> Result<(), AuctionError> {
        match self.state.status {
            AuctionStatus::ResultsSubmitted => self.transact(ctx, |state, ledger, ctx, events| {
                claims::finalize(state, ledger, ctx, events)
            }),
            _ => self.transact(ctx, |state, ledger, ctx, events| {
                settlement::settle(state, ledger, ctx, events).map(|_| ())
            }),
        }
    }

    pub fn submit_result(
        &mut self,
        ctx: &CallContext,
        root: B256,
        pointer: MultiHash,
        total_allocated: U256,
    ) -> Result<(), AuctionError> {
        self.transact(ctx, |state, _, ctx, events| {
            claims::submit_result(state, ctx, events, root, pointer, total_allocated)
        })
    }

    pub fn dispute(
        &mut self,
        ctx: &CallContext,
        root: B256,
        pointer: MultiHash,
        total_allocated: U256,
    ) -> Result<(), AuctionError> {
        self.transact(ctx, |state, ledger, ctx, events| {
            claims::dispute(state, ledger, ctx, events, root, pointer, total_allocated)
        })
    }

    pub fn claim(&mut self, ctx: &CallContext, request: ClaimRequest) -> Result<(), AuctionError> {
        self.transact(ctx, |state, ledger, ctx, events| {
            claims::claim(state, ledger, ctx, events, request)
        })
    }

    fn transact<T, H>(&mut self, ctx: &CallContext, handler: H) -> Result<T, AuctionError>
    where
        H: FnOnce(
            &mut AuctionState,
            &mut L,
            &CallContext,
            &mut Vec<AuctionEvent>,
        ) -> Result<T, AuctionError>,
    {
        let mut state: AuctionState = self.state.clone();
        let mut ledger: L = self.ledger.clone();
        let mut events: Vec<AuctionEvent> = Vec::new();

        let output: T = handler(&mut state, &mut ledger, ctx, &mut events)?;

        self.state = state;
        self.ledger = ledger;
        self.events.extend(events);
        Ok(output)
    }
}
