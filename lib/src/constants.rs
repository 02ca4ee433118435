//! This module contains constants used throughout the project.

/// Fixed-point scale of a price per token (18 decimals)
pub const PRICE_SCALE: u128 = 1_000_000_000_000_000_000;

/// Collateral the auctioneer posts when starting an auction, denominated in the payment asset
pub const DEFAULT_COLLATERAL_AMOUNT: u128 = 1_000_000_000_000_000_000; // 1 unit at 18 decimals

/// Length of the verification window opened by a result submission, in seconds
pub const DEFAULT_VERIFICATION_WINDOW: u64 = 86_400; // 1 day

/// Smallest price per token a bid may carry
pub const DEFAULT_MIN_PRICE_PER_TOKEN: u64 = 1;

/// Multihash code for keccak-256, used for content pointers produced by this crate
pub const KECCAK_256_MULTIHASH_CODE: u8 = 0x1b;

/// Size in bytes of a keccak-256 digest
pub const KECCAK_256_DIGEST_SIZE: u8 = 32;
