use crate::{
    allocations::{allocate, Allocation},
    auction_parameters::PartialFillPolicy,
    errors::AuctionError,
    events::AuctionEvent,
    ledger::AssetLedger,
    pricing::bid_cost,
    state::{AuctionState, AuctionStatus, CallContext, SettlementPath},
};
use alloy_primitives::{Address, U256};
use tracing::{debug, info};

/// Splits a winning bid's escrowed payment into what the auctioneer receives and what goes
/// back to the bidder.
///
/// # Arguments
///
/// * `policy` - How the unfilled part of a partial fill is treated.
/// * `allocated` - Units the bid receives.
/// * `requested` - Units the bid asked for.
/// * `price_per_token` - The bid's price.
/// * `escrowed` - Payment held for the bid.
///
/// # Returns
///
/// `(charged, refund)`, summing to `escrowed`.
pub fn split_payment(
    policy: PartialFillPolicy,
    allocated: U256,
    requested: U256,
    price_per_token: U256,
    escrowed: U256,
) -> Result<(U256, U256), AuctionError> {
    let charged: U256 = match policy {
        PartialFillPolicy::RefundUnfilled if allocated < requested => {
            bid_cost(allocated, price_per_token)?.min(escrowed)
        }
        _ => escrowed,
    };
    Ok((charged, escrowed - charged))
}

/// Credits `amount` of `asset` to `to`, skipping empty transfers.
pub(crate) fn pay_out<L: AssetLedger>(
    ledger: &mut L,
    asset: &Address,
    to: &Address,
    amount: U256,
) -> Result<(), AuctionError> {
    if !amount.is_zero() {
        ledger.credit(asset, to, amount)?;
    }
    Ok(())
}

/// Settles the auction on-engine by walking the book once.
///
/// Each bid, in priority order, receives `min(quantity, remaining)` units until the supply
/// runs out; the remaining bids are refunded in full. Winners' payments, unsold supply and
/// the collateral all go back to the auctioneer.
///
/// # Arguments
///
/// * `state` - The auction state, must be `Active` with the bidding period over.
/// * `ledger` - The ledger every payout is credited through.
/// * `ctx` - Call context.
/// * `events` - Event sink for this operation.
///
/// # Returns
///
/// The allocations applied, in book order.
pub fn settle<L: AssetLedger>(
    state: &mut AuctionState,
    ledger: &mut L,
    ctx: &CallContext,
    events: &mut Vec<AuctionEvent>,
) -> Result<Vec<Allocation>, AuctionError> {
    state.require_status(AuctionStatus::Active)?;
    state.require_ended(ctx)?;

    let asset: Address = state.asset;
    let payment_asset: Address = state.payment_asset();
    let policy: PartialFillPolicy = state.parameters.partial_fill_policy;
    let allocations: Vec<Allocation> = allocate(&state.book, state.total_supply_for_sale);

    let mut proceeds: U256 = U256::ZERO;
    let mut sold: U256 = U256::ZERO;
    for allocation in allocations.iter() {
        let escrowed: U256 = state
            .escrow
            .take(&allocation.bidder)
            .ok_or(AuctionError::EntryNotFound(allocation.bidder))?;

        let refund: U256 = if allocation.is_winning() {
            pay_out(ledger, &asset, &allocation.bidder, allocation.quantity)?;
            state
                .book
                .mark_filled(&allocation.bidder, allocation.quantity)?;

            let (charged, refund) = split_payment(
                policy,
                allocation.quantity,
                allocation.requested,
                allocation.price_per_token,
                escrowed,
            )?;
            proceeds += charged;
            sold += allocation.quantity;

            debug!(
                bidder = %allocation.bidder,
                quantity = %allocation.quantity,
                charged = %charged,
                "bid filled"
            );
            events.push(AuctionEvent::TokensClaimed {
                claimant: allocation.bidder,
                quantity: allocation.quantity,
            });
            refund
        } else {
            escrowed
        };

        if !refund.is_zero() {
            pay_out(ledger, &payment_asset, &allocation.bidder, refund)?;
            events.push(AuctionEvent::RefundIssued {
                bidder: allocation.bidder,
                amount: refund,
            });
        }
    }

    let unsold: U256 = state.total_supply_for_sale - sold;
    let auctioneer: Address = state.auctioneer;
    pay_out(ledger, &payment_asset, &auctioneer, proceeds)?;
    pay_out(ledger, &asset, &auctioneer, unsold)?;
    pay_out(ledger, &payment_asset, &auctioneer, state.escrow.collateral)?;

    state.escrow.collateral = U256::ZERO;
    state.escrow.asset_held = U256::ZERO;
    state.status = AuctionStatus::Ended;
    state.settlement = Some(SettlementPath::Direct);

    info!(
        proceeds = %proceeds,
        sold = %sold,
        unsold = %unsold,
        bids = allocations.len(),
        "auction settled"
    );
    events.push(AuctionEvent::AuctionEnded { proceeds, unsold });
    Ok(allocations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PRICE_SCALE;

    #[test]
    fn test_split_payment_no_refund() {
        let (charged, refund) = split_payment(
            PartialFillPolicy::NoRefund,
            U256::from(50),
            U256::from(60),
            U256::from(2) * U256::from(PRICE_SCALE),
            U256::from(120),
        )
        .unwrap();
        assert_eq!(charged, U256::from(120));
        assert_eq!(refund, U256::ZERO);
    }

    #[test]
    fn test_split_payment_refund_unfilled() {
        let (charged, refund) = split_payment(
            PartialFillPolicy::RefundUnfilled,
            U256::from(50),
            U256::from(60),
            U256::from(2) * U256::from(PRICE_SCALE),
            U256::from(120),
        )
        .unwrap();
        assert_eq!(charged, U256::from(100));
        assert_eq!(refund, U256::from(20));
    }

    #[test]
    fn test_split_payment_full_fill_keeps_everything() {
        let (charged, refund) = split_payment(
            PartialFillPolicy::RefundUnfilled,
            U256::from(60),
            U256::from(60),
            U256::from(2) * U256::from(PRICE_SCALE),
            U256::from(120),
        )
        .unwrap();
        assert_eq!(charged, U256::from(120));
        assert!(refund.is_zero());
    }
}
