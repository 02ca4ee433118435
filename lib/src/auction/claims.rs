use super::settlement::{pay_out, split_payment};
use crate::{
    auction_parameters::ClaimOrdering,
    errors::AuctionError,
    events::AuctionEvent,
    hashing::keccak256,
    ledger::AssetLedger,
    orders::Bid,
    state::{AuctionState, AuctionStatus, CallContext, CommittedResult, SettlementPath},
    types::multihash::MultiHash,
    utils::{verify_proof, ClaimLeaf},
};
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A claim against the committed result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequest {
    /// Identity the claim pays out to, also the key of its escrow entry
    pub claimant: Address,
    /// Units claimed, zero to claim a refund
    pub quantity: U256,
    pub serial: u64,
    /// Sibling hashes from the leaf up to the root
    pub proof: Vec<B256>,
}

fn check_result(
    state: &AuctionState,
    root: &B256,
    pointer: &MultiHash,
    total_allocated: U256,
) -> Result<(), AuctionError> {
    if *root == B256::ZERO {
        return Err(AuctionError::InvalidRoot);
    }
    if !pointer.is_valid() {
        return Err(AuctionError::InvalidContentPointer);
    }
    if total_allocated > state.total_supply_for_sale {
        return Err(AuctionError::AllocationExceedsSupply {
            allocated: total_allocated,
            supply: state.total_supply_for_sale,
        });
    }
    Ok(())
}

/// Commits the result root and content pointer computed off-engine, opening the
/// verification window.
///
/// # Arguments
///
/// * `state` - The auction state, must be `Active` with the bidding period over.
/// * `ctx` - Call context, the sender must be the auctioneer.
/// * `events` - Event sink for this operation.
/// * `root` - Root of the tree over every claim leaf.
/// * `pointer` - Content pointer to the full published result.
/// * `total_allocated` - Units the result hands out, at most the supply for sale.
pub fn submit_result(
    state: &mut AuctionState,
    ctx: &CallContext,
    events: &mut Vec<AuctionEvent>,
    root: B256,
    pointer: MultiHash,
    total_allocated: U256,
) -> Result<(), AuctionError> {
    if state.status == AuctionStatus::ResultsSubmitted {
        return Err(AuctionError::ResultsAlreadySubmitted);
    }
    state.require_status(AuctionStatus::Active)?;
    state.require_auctioneer(ctx)?;
    state.require_ended(ctx)?;
    check_result(state, &root, &pointer, total_allocated)?;

    let verification_deadline: u64 = ctx
        .timestamp
        .checked_add(state.parameters.verification_window)
        .ok_or(AuctionError::MathOverflow)?;

    state.committed = Some(CommittedResult {
        root,
        pointer: pointer.clone(),
        total_allocated,
    });
    state.verification_deadline = Some(verification_deadline);
    state.status = AuctionStatus::ResultsSubmitted;

    info!(
        %root,
        total_allocated = %total_allocated,
        verification_deadline,
        "results submitted"
    );
    events.push(AuctionEvent::ResultsSubmitted {
        root,
        pointer,
        total_allocated,
        verification_deadline,
    });
    Ok(())
}

/// Replaces the committed result with the watchdog's correction and forfeits the
/// auctioneer's collateral to the watchdog.
///
/// # Arguments
///
/// * `state` - The auction state, must be `ResultsSubmitted` within the verification window.
/// * `ledger` - The ledger the collateral is credited through.
/// * `ctx` - Call context, the sender must be the watchdog.
/// * `events` - Event sink for this operation.
/// * `root` - The corrected root, must differ from the committed one.
/// * `pointer` - The corrected content pointer, must differ from the committed one.
/// * `total_allocated` - Units the corrected result hands out.
pub fn dispute<L: AssetLedger>(
    state: &mut AuctionState,
    ledger: &mut L,
    ctx: &CallContext,
    events: &mut Vec<AuctionEvent>,
    root: B256,
    pointer: MultiHash,
    total_allocated: U256,
) -> Result<(), AuctionError> {
    state.require_status(AuctionStatus::ResultsSubmitted)?;
    let watchdog: Address = state.parameters.watchdog;
    if ctx.sender != watchdog {
        return Err(AuctionError::NotAuthorized(ctx.sender));
    }
    let deadline: u64 = state
        .verification_deadline
        .ok_or(AuctionError::NoCommittedResult)?;
    if ctx.timestamp > deadline {
        return Err(AuctionError::VerificationWindowClosed { deadline });
    }
    if state.slashed {
        return Err(AuctionError::AlreadyDisputed);
    }
    check_result(state, &root, &pointer, total_allocated)?;

    let previous: &CommittedResult = state
        .committed
        .as_ref()
        .ok_or(AuctionError::NoCommittedResult)?;
    if previous.root == root || previous.pointer == pointer {
        return Err(AuctionError::UnchangedResult);
    }
    let previous_root: B256 = previous.root;

    let collateral: U256 = state.escrow.collateral;
    pay_out(ledger, &state.payment_asset(), &watchdog, collateral)?;
    state.escrow.collateral = U256::ZERO;
    state.slashed = true;
    state.committed = Some(CommittedResult {
        root,
        pointer: pointer.clone(),
        total_allocated,
    });

    warn!(
        %watchdog,
        %previous_root,
        %root,
        collateral = %collateral,
        "results disputed, auctioneer penalized"
    );
    events.push(AuctionEvent::ResultsDisputed {
        watchdog,
        previous_root,
        root,
        pointer,
        total_allocated,
    });
    events.push(AuctionEvent::AuctioneerPenalized {
        auctioneer: state.auctioneer,
        collateral,
    });
    Ok(())
}

/// Ends the auction once the verification window has elapsed. The supply the committed result
/// leaves unallocated goes back to the auctioneer, as does the collateral unless it was
/// forfeited. Claims open from here on, capped at the allocated total.
///
/// # Arguments
///
/// * `state` - The auction state, must be `ResultsSubmitted`.
/// * `ledger` - The ledger the collateral is credited through.
/// * `ctx` - Call context.
/// * `events` - Event sink for this operation.
pub fn finalize<L: AssetLedger>(
    state: &mut AuctionState,
    ledger: &mut L,
    ctx: &CallContext,
    events: &mut Vec<AuctionEvent>,
) -> Result<(), AuctionError> {
    state.require_status(AuctionStatus::ResultsSubmitted)?;
    let deadline: u64 = state
        .verification_deadline
        .ok_or(AuctionError::NoCommittedResult)?;
    if ctx.timestamp <= deadline {
        return Err(AuctionError::VerificationWindowOpen { deadline });
    }

    let total_allocated: U256 = state
        .committed
        .as_ref()
        .map(|committed: &CommittedResult| committed.total_allocated)
        .ok_or(AuctionError::NoCommittedResult)?;
    let unsold: U256 = state
        .total_supply_for_sale
        .checked_sub(total_allocated)
        .ok_or(AuctionError::AllocationExceedsSupply {
            allocated: total_allocated,
            supply: state.total_supply_for_sale,
        })?;

    let auctioneer: Address = state.auctioneer;
    pay_out(ledger, &state.asset, &auctioneer, unsold)?;
    state.escrow.asset_held = state.escrow.asset_held.saturating_sub(unsold);
    if !state.slashed {
        pay_out(ledger, &state.payment_asset(), &auctioneer, state.escrow.collateral)?;
        state.escrow.collateral = U256::ZERO;
    }
    state.remaining_claimable_supply = total_allocated;
    state.status = AuctionStatus::Ended;
    state.settlement = Some(SettlementPath::Claims);

    info!(
        slashed = state.slashed,
        unsold = %unsold,
        "auction ended, claims open"
    );
    // Proceeds reach the auctioneer claim by claim
    events.push(AuctionEvent::AuctionEnded {
        proceeds: U256::ZERO,
        unsold,
    });
    Ok(())
}

/// Pays out one entry of the committed result.
///
/// The leaf is rebuilt from the request and checked against the committed root. The
/// claimant's escrow entry is consumed, so each identity claims at most once. A nonzero
/// quantity credits the asset and forwards the payment to the auctioneer; a zero quantity
/// refunds the escrowed payment.
///
/// # Arguments
///
/// * `state` - The auction state, must be `Ended` through the claim path.
/// * `ledger` - The ledger payouts are credited through.
/// * `ctx` - Call context. Anyone may submit a claim; value only ever goes to the claimant.
/// * `events` - Event sink for this operation.
/// * `request` - The claim.
pub fn claim<L: AssetLedger>(
    state: &mut AuctionState,
    ledger: &mut L,
    ctx: &CallContext,
    events: &mut Vec<AuctionEvent>,
    request: ClaimRequest,
) -> Result<(), AuctionError> {
    state.require_status(AuctionStatus::Ended)?;
    if state.settlement != Some(SettlementPath::Claims) {
        return Err(AuctionError::NoCommittedResult);
    }
    let root: B256 = state
        .committed
        .as_ref()
        .map(|committed: &CommittedResult| committed.root)
        .ok_or(AuctionError::NoCommittedResult)?;

    let claimant: Address = request.claimant;
    let escrowed: U256 = state
        .escrow
        .payment_of(&claimant)
        .ok_or(AuctionError::EntryNotFound(claimant))?;

    let leaf: B256 =
        ClaimLeaf::new(claimant, request.serial, request.quantity).hash(&keccak256);
    if !verify_proof(&keccak256, &root, &leaf, &request.proof) {
        return Err(AuctionError::InvalidProof);
    }

    if state.parameters.claim_ordering == ClaimOrdering::Sequential {
        if request.serial != state.next_claim_serial {
            return Err(AuctionError::ClaimOutOfOrder {
                expected: state.next_claim_serial,
                got: request.serial,
            });
        }
        state.next_claim_serial += 1;
    }

    let payment_asset: Address = state.payment_asset();
    if request.quantity.is_zero() {
        state.escrow.take(&claimant);
        pay_out(ledger, &payment_asset, &claimant, escrowed)?;

        debug!(%claimant, serial = request.serial, refund = %escrowed, "refund claimed");
        events.push(AuctionEvent::RefundIssued {
            bidder: claimant,
            amount: escrowed,
        });
        return Ok(());
    }

    let bid: &Bid = state
        .book
        .get(&claimant)
        .ok_or(AuctionError::CorruptedBook(claimant))?;
    if request.quantity > bid.quantity {
        return Err(AuctionError::ClaimExceedsBid {
            claimed: request.quantity,
            bid: bid.quantity,
        });
    }
    if request.quantity > state.remaining_claimable_supply {
        return Err(AuctionError::InsufficientSupply {
            requested: request.quantity,
            remaining: state.remaining_claimable_supply,
        });
    }
    let (charged, refund) = split_payment(
        state.parameters.partial_fill_policy,
        request.quantity,
        bid.quantity,
        bid.price_per_token,
        escrowed,
    )?;

    state.escrow.take(&claimant);
    state.remaining_claimable_supply -= request.quantity;
    state.escrow.asset_held = state.escrow.asset_held.saturating_sub(request.quantity);

    let auctioneer: Address = state.auctioneer;
    pay_out(ledger, &state.asset, &claimant, request.quantity)?;
    pay_out(ledger, &payment_asset, &auctioneer, charged)?;
    pay_out(ledger, &payment_asset, &claimant, refund)?;

    debug!(
        %claimant,
        serial = request.serial,
        quantity = %request.quantity,
        charged = %charged,
        "tokens claimed"
    );
    events.push(AuctionEvent::TokensClaimed {
        claimant,
        quantity: request.quantity,
    });
    if !refund.is_zero() {
        events.push(AuctionEvent::RefundIssued {
            bidder: claimant,
            amount: refund,
        });
    }
    Ok(())
}
