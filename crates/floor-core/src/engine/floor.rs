//! # Floor Rebalancing
//!
//! The floor only ever moves up. `calculate_new_floor_id` is the pure scan
//! that finds the highest bin whose price the accumulated quote can back;
//! the `FloorToken` methods around it burn the quote-holding bins below the
//! new floor and re-mint everything into the new floor bin without touching
//! quote that third parties have in flight inside the pair.

use crate::constants::PRECISION;
use crate::engine::snapshot::snapshot_range;
use crate::errors::{FloorError, FloorResult};
use crate::events::FloorEvent;
use crate::gateway::{PairGateway, QuoteToken, TokenLedger};
use crate::token::FloorToken;
use floor_math::bin_math::{
    mul_div_round_down, mul_div_round_up, mul_shift_round_up, price_from_id,
    shift_div_round_down, SCALE_OFFSET,
};
use floor_math::{MathError, MathResult, U256};

/// Highest bin id whose price the quote backing can cover.
///
/// Scans downward from one past the effective ceiling. At each bin the
/// backing requirement is `circulating * price(id)` rounded up; when it
/// exceeds what is available, that bin's own quote reserve stops counting
/// as backing and its value at the bin price leaves the circulating supply
/// (that quote is what buyers paid to take floor tokens out of the bin).
///
/// A `roof_id` of zero means the roof was never raised and puts no cap on
/// the scan beyond the active bin. The result is clamped below `active_id`
/// so the floor bin never becomes the trading bin.
pub fn calculate_new_floor_id(
    floor_id: u32,
    active_id: u32,
    roof_id: u32,
    bin_step: u32,
    circulating_supply: U256,
    quote_available: U256,
    quote_reserves: &[U256],
) -> MathResult<u32> {
    if floor_id >= active_id {
        return Ok(floor_id);
    }

    let ceiling = if roof_id == 0 {
        active_id
    } else {
        active_id.min(roof_id)
    };

    let mut circulating = circulating_supply;
    let mut available = quote_available;
    let mut id = ceiling.saturating_add(1);

    while id > floor_id {
        id -= 1;
        let price = price_from_id(id, bin_step)?;
        let needed = mul_shift_round_up(circulating, price, SCALE_OFFSET)?;
        if needed <= available {
            break;
        }
        // Bins above the snapshot range or above the active id hold no quote
        let reserve = quote_reserves
            .get((id - floor_id) as usize)
            .copied()
            .unwrap_or(U256::ZERO);
        if !reserve.is_zero() {
            available = available
                .checked_sub(&reserve)
                .ok_or(MathError::Underflow)?;
            let sold = shift_div_round_down(reserve, SCALE_OFFSET, price)?;
            circulating = circulating
                .checked_sub(&sold)
                .ok_or(MathError::Underflow)?;
        }
    }

    Ok(if active_id > id { id } else { active_id - 1 })
}

impl<P, L, Q> FloorToken<P, L, Q>
where
    P: PairGateway,
    L: TokenLedger,
    Q: QuoteToken,
{
    /// Raise the floor if the accumulated quote allows it.
    ///
    /// Returns `Ok(true)` when the floor moved, `Ok(false)` when it is
    /// already as high as the backing supports. Fails while rebalancing is
    /// paused, or fatally if the pair misbehaves mid-operation.
    pub fn rebalance_floor(&mut self) -> FloorResult<bool> {
        if self.state.rebalance_paused {
            return Err(FloorError::RebalancePaused);
        }
        self.with_guard(|token| token.rebalance_floor_inner())
    }

    fn rebalance_floor_inner(&mut self) -> FloorResult<bool> {
        let floor_id = self.state.floor_id;
        let roof_id = self.state.roof_id;
        let active_id = self.pair.active_id();

        // The floor stays strictly below the active bin, so there is nothing
        // to do unless at least one bin separates them.
        if floor_id.saturating_add(1) >= active_id {
            return Ok(false);
        }

        let top_id = self.scan_top(active_id);
        let snapshot = snapshot_range(&self.pair, self.self_address, floor_id, active_id, top_id)?;
        let circulating = self.circulating_supply(&snapshot.total_floor_in_pair)?;

        let new_floor_id = calculate_new_floor_id(
            floor_id,
            active_id,
            roof_id,
            self.state.bin_step,
            circulating,
            snapshot.total_quote_in_pair,
            &snapshot.quote_reserves,
        )?;
        if new_floor_id <= floor_id {
            return Ok(false);
        }

        let nb_bins = (new_floor_id - floor_id) as usize;
        let mut ids = Vec::with_capacity(nb_bins);
        let mut shares = Vec::with_capacity(nb_bins);
        for offset in 0..nb_bins {
            if !snapshot.quote_reserves[offset].is_zero() {
                ids.push(floor_id + offset as u32);
                shares.push(snapshot.shares_left_side[offset]);
            }
        }

        // Persist before moving liquidity so reentrant observers already see
        // the raised floor.
        self.state.floor_id = new_floor_id;

        if !ids.is_empty() {
            self.safe_rebalance(&ids, &shares, new_floor_id)?;
        }

        self.events.push(FloorEvent::FloorRebalanced {
            floor_id: new_floor_id,
        });
        Ok(true)
    }

    /// Burn the given bins and re-mint the freed quote into the new floor
    /// bin, without capturing quote that third parties have in flight.
    ///
    /// Must run with the reentrancy guard held; `rebalance_floor` is the
    /// only caller.
    fn safe_rebalance(&mut self, ids: &[u32], shares: &[U256], new_floor_id: u32) -> FloorResult<()> {
        let (floor_reserve_before, quote_reserve_before) = self.net_reserves();

        self.pair.burn(ids, shares, self.pair_address)?;

        let (_, quote_fees) = self.pair.protocol_fees();
        let quote_balance = self
            .quote
            .balance_of(self.pair_address)
            .checked_sub(&quote_fees)
            .ok_or(MathError::Underflow)?;
        let (floor_reserve_after, quote_reserve_after) = self.net_reserves();

        if floor_reserve_after != floor_reserve_before {
            return Err(FloorError::TokenReserveChanged);
        }

        let delta_reserve = quote_reserve_before
            .checked_sub(&quote_reserve_after)
            .ok_or(MathError::Underflow)?;
        let delta_balance = quote_balance
            .checked_sub(&quote_reserve_after)
            .ok_or(MathError::Underflow)?;

        // When the pair's pending quote exceeds what the burn released, some
        // of it belongs to a concurrent deposit. Scale the distribution down
        // (rounding up) so the mint takes at least the burned amount and at
        // most a rounding unit beyond it.
        let distribution = if delta_balance > delta_reserve {
            mul_div_round_up(delta_reserve, PRECISION, delta_balance)?
        } else {
            PRECISION
        };

        let minted = self.pair.mint(
            &[new_floor_id],
            &[U256::ZERO],
            &[distribution],
            self.self_address,
        )?;
        if !minted.token_added.is_zero() {
            return Err(FloorError::InvalidAmounts);
        }

        let expected_quote = mul_div_round_down(delta_balance, distribution, PRECISION)?;
        if minted.quote_added != expected_quote || minted.quote_added < delta_reserve {
            return Err(FloorError::BrokenInvariant);
        }

        Ok(())
    }
}
