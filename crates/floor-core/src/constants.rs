//! # Engine Constants

use floor_math::U256;

/// Liquidity distribution scale: a distribution of `PRECISION` deposits the
/// pair's entire pending balance of a token into a single bin.
pub const PRECISION: U256 = U256::from_u128(1_000_000_000_000_000_000);
