//! # Position Snapshot
//!
//! One pass over the engine's bin range, valuing its liquidity shares as
//! underlying amounts. Taken fresh at the start of every rebalance and again
//! after any external call whose outcome it feeds.

use crate::errors::FloorResult;
use crate::gateway::PairGateway;
use crate::types::Address;
use floor_math::bin_math::mul_div_round_down;
use floor_math::{MathError, U256};

/// What the engine's shares are worth across `floor_id..=top_id`
#[derive(Debug, Clone, Default)]
pub struct BinSnapshot {
    /// Floor tokens redeemable from all scanned bins
    pub total_floor_in_pair: U256,
    /// Quote redeemable from all scanned bins
    pub total_quote_in_pair: U256,
    /// Per-bin share balances for bins at or below the active id,
    /// indexed by `id - floor_id`
    pub shares_left_side: Vec<U256>,
    /// Per-bin redeemable quote for bins at or below the active id,
    /// indexed by `id - floor_id`
    pub quote_reserves: Vec<U256>,
}

/// Value `owner`'s shares over `floor_id..=top_id`.
///
/// Bins where the owner holds no shares are skipped. Redeemable amounts
/// round down, matching what a burn would actually pay out.
pub fn snapshot_range<P: PairGateway>(
    pair: &P,
    owner: Address,
    floor_id: u32,
    active_id: u32,
    top_id: u32,
) -> FloorResult<BinSnapshot> {
    let mut snapshot = BinSnapshot::default();
    if top_id < floor_id {
        return Ok(snapshot);
    }

    let nb_bins = (top_id - floor_id + 1) as usize;
    let nb_left_side = if floor_id > active_id {
        0
    } else {
        (active_id - floor_id + 1) as usize
    };
    snapshot.shares_left_side = vec![U256::ZERO; nb_left_side];
    snapshot.quote_reserves = vec![U256::ZERO; nb_left_side];

    for offset in 0..nb_bins {
        let id = floor_id + offset as u32;
        let share = pair.share_balance_of(owner, id);
        if share.is_zero() {
            continue;
        }

        let reserves = pair.bin_reserves(id);
        let total_shares = pair.share_total_supply(id);

        let floor_amount = if reserves.token.is_zero() {
            U256::ZERO
        } else {
            mul_div_round_down(share, reserves.token, total_shares)?
        };
        let quote_amount = if reserves.quote.is_zero() {
            U256::ZERO
        } else {
            mul_div_round_down(share, reserves.quote, total_shares)?
        };

        snapshot.total_floor_in_pair = snapshot
            .total_floor_in_pair
            .checked_add(&floor_amount)
            .ok_or(MathError::Overflow)?;
        snapshot.total_quote_in_pair = snapshot
            .total_quote_in_pair
            .checked_add(&quote_amount)
            .ok_or(MathError::Overflow)?;

        if id <= active_id {
            snapshot.shares_left_side[offset] = share;
            snapshot.quote_reserves[offset] = quote_amount;
        }
    }

    Ok(snapshot)
}
