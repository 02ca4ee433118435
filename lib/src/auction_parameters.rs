//! Configuration fixed at auction creation.

use crate::constants::{
    DEFAULT_COLLATERAL_AMOUNT, DEFAULT_MIN_PRICE_PER_TOKEN, DEFAULT_VERIFICATION_WINDOW,
};
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Whether claims on the committed result must be paid out in serial order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOrdering {
    /// A claim must carry exactly the next unpaid serial.
    #[default]
    Sequential,
    /// Claims may be paid in any order; the serial is still part of the leaf.
    Unordered,
}

/// What happens to the unfilled part of the bid that exhausts the supply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialFillPolicy {
    /// The partially filled bid pays its full escrowed amount for the units it receives.
    #[default]
    NoRefund,
    /// The partially filled bid pays only `cost(allocated, price)` and gets the rest back.
    RefundUnfilled,
}

/// Parameters an auction is created with. Every field falls back to its default when
/// missing from a serialized configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuctionParameters {
    /// Asset bidders pay with; collateral is posted in this asset too.
    pub payment_asset: Address,
    /// Collateral pulled from the auctioneer at start, forfeited on a successful dispute.
    pub collateral_amount: U256,
    /// Seconds a submitted result stays open to disputes.
    pub verification_window: u64,
    /// Smallest accepted price per token.
    pub min_price_per_token: U256,
    /// The only identity allowed to dispute a submitted result.
    pub watchdog: Address,
    pub claim_ordering: ClaimOrdering,
    pub partial_fill_policy: PartialFillPolicy,
}

impl Default for AuctionParameters {
    fn default() -> Self {
        Self {
            payment_asset: Address::ZERO,
            collateral_amount: U256::from(DEFAULT_COLLATERAL_AMOUNT),
            verification_window: DEFAULT_VERIFICATION_WINDOW,
            min_price_per_token: U256::from(DEFAULT_MIN_PRICE_PER_TOKEN),
            watchdog: Address::ZERO,
            claim_ordering: ClaimOrdering::default(),
            partial_fill_policy: PartialFillPolicy::default(),
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Creates parameters with a random watchdog and payment asset.
    pub fn random_auction_parameters() -> AuctionParameters {
        AuctionParameters {
            payment_asset: Address::random(),
            watchdog: Address::random(),
            ..AuctionParameters::default()
        }
    }

    #[test]
    fn test_defaults() {
        let parameters = AuctionParameters::default();
        assert_eq!(parameters.collateral_amount, U256::from(DEFAULT_COLLATERAL_AMOUNT));
        assert_eq!(parameters.verification_window, DEFAULT_VERIFICATION_WINDOW);
        assert_eq!(parameters.claim_ordering, ClaimOrdering::Sequential);
        assert_eq!(parameters.partial_fill_policy, PartialFillPolicy::NoRefund);
    }

    #[test]
    fn test_bincode_round_trip() {
        let parameters = AuctionParameters {
            claim_ordering: ClaimOrdering::Unordered,
            partial_fill_policy: PartialFillPolicy::RefundUnfilled,
            ..random_auction_parameters()
        };
        let bytes = bincode::serialize(&parameters).unwrap();
        let decoded: AuctionParameters = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, parameters);
    }
}
