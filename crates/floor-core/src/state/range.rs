//! # Bin Range State
//!
//! The persistent view of where the engine's liquidity sits: the floor bin,
//! the roof bin, and the deposit policy for roof bins.

use floor_math::U256;

/// Position of the engine's liquidity inside the pair's bin space.
///
/// Invariant: `floor_id <= roof_id` whenever `roof_id != 0`. A zero
/// `roof_id` means the roof was never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeState {
    /// Bin holding the consolidated quote backing; only ever increases
    pub floor_id: u32,
    /// Highest bin pre-provisioned with floor tokens, 0 if never raised
    pub roof_id: u32,
    /// Pair's bin step in basis points
    pub bin_step: u32,
    /// Floor tokens deposited per roof bin
    pub floor_per_bin: U256,
    /// When set, automatic rebalancing and transfer hooks stand down
    pub rebalance_paused: bool,
}

impl RangeState {
    pub fn new(floor_id: u32, bin_step: u32, floor_per_bin: U256) -> Self {
        RangeState {
            floor_id,
            roof_id: 0,
            bin_step,
            floor_per_bin,
            rebalance_paused: false,
        }
    }
}
