//! Fixed-point bid cost arithmetic.

use crate::{constants::PRICE_SCALE, errors::AuctionError};
use alloy_primitives::{U256, U512};

/// Computes what a bid of `quantity` units at `price_per_token` costs, rounding up so the
/// engine never under-collects.
///
/// `cost = ceil(quantity * price_per_token / PRICE_SCALE)`, with the product taken at 512 bits
/// so it cannot overflow before the division.
///
/// # Arguments
///
/// * `quantity` - Number of asset units bid for.
/// * `price_per_token` - Price of one unit, scaled by `PRICE_SCALE`.
///
/// # Returns
///
/// The cost in payment-asset units, or `AuctionError::MathOverflow` if it does not fit in 256
/// bits.
pub fn bid_cost(quantity: U256, price_per_token: U256) -> Result<U256, AuctionError> {
    let scale: U512 = U512::from(PRICE_SCALE);
    let product: U512 = widen(quantity) * widen(price_per_token);
    let mut cost: U512 = product / scale;
    if !(product % scale).is_zero() {
        cost += U512::from(1u8);
    }
    narrow(cost).ok_or(AuctionError::MathOverflow)
}

fn widen(value: U256) -> U512 {
    let limbs = value.as_limbs();
    U512::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3], 0, 0, 0, 0])
}

fn narrow(value: U512) -> Option<U256> {
    let limbs = value.as_limbs();
    if limbs[4..].iter().any(|limb| *limb != 0) {
        return None;
    }
    Some(U256::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaled(price: u64) -> U256 {
        U256::from(price) * U256::from(PRICE_SCALE)
    }

    #[test]
    fn test_whole_prices() {
        assert_eq!(bid_cost(U256::from(20), scaled(3)).unwrap(), U256::from(60));
        assert_eq!(bid_cost(U256::from(60), scaled(2)).unwrap(), U256::from(120));
        assert_eq!(bid_cost(U256::ZERO, scaled(2)).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_rounds_up() {
        // 1 unit at 1 wei per token costs a fraction of a wei
        assert_eq!(bid_cost(U256::from(1), U256::from(1)).unwrap(), U256::from(1));
        // 3 units at 0.5 per token cost 1.5
        let half = U256::from(PRICE_SCALE / 2);
        assert_eq!(bid_cost(U256::from(3), half).unwrap(), U256::from(2));
        // Exact products are not rounded
        assert_eq!(bid_cost(U256::from(4), half).unwrap(), U256::from(2));
    }

    #[test]
    fn test_wide_intermediate() {
        // The product overflows 256 bits, the cost does not
        let quantity = U256::MAX / U256::from(2);
        let cost = bid_cost(quantity, U256::from(PRICE_SCALE)).unwrap();
        assert_eq!(cost, quantity);
    }

    #[test]
    fn test_overflow() {
        assert_eq!(
            bid_cost(U256::MAX, U256::MAX),
            Err(AuctionError::MathOverflow)
        );
    }

    #[test]
    fn test_monotonic_in_quantity() {
        for _ in 0..64 {
            let price = U256::from(rand::random::<u64>());
            let a = U256::from(rand::random::<u64>());
            let b = a + U256::from(rand::random::<u32>());
            assert!(bid_cost(a, price).unwrap() <= bid_cost(b, price).unwrap());
        }
    }
}
