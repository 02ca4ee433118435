use crate::{
    errors::AuctionError,
    events::AuctionEvent,
    ledger::AssetLedger,
    orders::Bid,
    pricing::bid_cost,
    state::{AuctionState, AuctionStatus, CallContext},
};
use alloy_primitives::{Address, U256};
use tracing::{debug, info};

/// Opens the auction for bidding.
///
/// Pulls the auctioneer's collateral (in the payment asset) and the whole supply for sale
/// into escrow, then fixes the bidding period to `[now, now + duration)`.
///
/// # Arguments
///
/// * `state` - The auction state, must be `Inactive`.
/// * `ledger` - The ledger the collateral and supply are pulled through.
/// * `ctx` - Call context, the sender must be the auctioneer.
/// * `events` - Event sink for this operation.
/// * `asset` - The asset being sold.
/// * `supply` - Units of `asset` for sale.
/// * `duration` - Length of the bidding period, in seconds.
pub fn start<L: AssetLedger>(
    state: &mut AuctionState,
    ledger: &mut L,
    ctx: &CallContext,
    events: &mut Vec<AuctionEvent>,
    asset: Address,
    supply: U256,
    duration: u64,
) -> Result<(), AuctionError> {
    state.require_status(AuctionStatus::Inactive)?;
    state.require_auctioneer(ctx)?;
    if supply.is_zero() {
        return Err(AuctionError::ZeroSupply);
    }
    if duration == 0 {
        return Err(AuctionError::ZeroDuration);
    }
    let watchdog: Address = state.parameters.watchdog;
    if watchdog == Address::ZERO || watchdog == state.auctioneer {
        return Err(AuctionError::InvalidWatchdog(watchdog));
    }
    let end_time: u64 = ctx
        .timestamp
        .checked_add(duration)
        .ok_or(AuctionError::MathOverflow)?;

    let collateral: U256 = state.parameters.collateral_amount;
    if !collateral.is_zero() {
        ledger.escrow_pull(&state.payment_asset(), &state.auctioneer, collateral)?;
    }
    ledger.escrow_pull(&asset, &state.auctioneer, supply)?;

    state.asset = asset;
    state.total_supply_for_sale = supply;
    state.start_time = ctx.timestamp;
    state.end_time = end_time;
    state.escrow.collateral = collateral;
    state.escrow.asset_held = supply;
    state.status = AuctionStatus::Active;

    info!(
        auctioneer = %state.auctioneer,
        asset = %asset,
        supply = %supply,
        end_time,
        "auction started"
    );
    events.push(AuctionEvent::AuctionStarted {
        auctioneer: state.auctioneer,
        asset,
        total_supply_for_sale: supply,
        start_time: ctx.timestamp,
        end_time,
    });
    Ok(())
}

/// Places the sender's bid in the book and escrows its payment.
///
/// # Arguments
///
/// * `state` - The auction state, must be `Active` with bidding still open.
/// * `ledger` - The ledger the payment is pulled through.
/// * `ctx` - Call context, the sender is the bidder.
/// * `events` - Event sink for this operation.
/// * `quantity` - Units bid for.
/// * `price_per_token` - Price of one unit, scaled by `PRICE_SCALE`.
/// * `payment` - Payment offered, must equal `bid_cost(quantity, price_per_token)`.
pub fn place_bid<L: AssetLedger>(
    state: &mut AuctionState,
    ledger: &mut L,
    ctx: &CallContext,
    events: &mut Vec<AuctionEvent>,
    quantity: U256,
    price_per_token: U256,
    payment: U256,
) -> Result<(), AuctionError> {
    state.require_status(AuctionStatus::Active)?;
    if ctx.timestamp >= state.end_time {
        return Err(AuctionError::BiddingClosed {
            end_time: state.end_time,
        });
    }
    if quantity.is_zero() {
        return Err(AuctionError::ZeroQuantity);
    }
    let minimum: U256 = state.parameters.min_price_per_token;
    if price_per_token < minimum {
        return Err(AuctionError::PriceBelowMinimum {
            minimum,
            price: price_per_token,
        });
    }
    let expected: U256 = bid_cost(quantity, price_per_token)?;
    if payment != expected {
        return Err(AuctionError::PaymentMismatch {
            expected,
            provided: payment,
        });
    }
    if state.book.contains(&ctx.sender) {
        return Err(AuctionError::DuplicateBid(ctx.sender));
    }

    ledger.escrow_pull(&state.payment_asset(), &ctx.sender, payment)?;
    state.escrow.deposit(&ctx.sender, payment)?;
    state.book.insert(Bid::new(
        ctx.sender,
        quantity,
        price_per_token,
        ctx.timestamp,
        state.total_bid_count,
    ))?;
    state.total_bid_count += 1;

    debug!(
        bidder = %ctx.sender,
        quantity = %quantity,
        price_per_token = %price_per_token,
        "bid placed"
    );
    events.push(AuctionEvent::BidPlaced {
        bidder: ctx.sender,
        quantity,
        price_per_token,
        payment,
    });
    Ok(())
}
