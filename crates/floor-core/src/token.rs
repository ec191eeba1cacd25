//! # Floor Token Engine
//!
//! [`FloorToken`] ties the range state, the reentrancy guard and the three
//! external collaborators together. The floor and roof operations live in
//! the [`crate::engine`] impl blocks; this module holds construction,
//! ownership, pausing, the transfer hook and the read-only queries.

use crate::engine::floor;
use crate::engine::snapshot::snapshot_range;
use crate::errors::{FloorError, FloorResult};
use crate::events::FloorEvent;
use crate::gateway::{PairGateway, QuoteToken, TokenLedger, TransferHook};
use crate::state::range::RangeState;
use crate::state::reentrancy::GuardStatus;
use crate::types::Address;
use floor_math::bin_math::price_from_id;
use floor_math::{MathError, U256};

/// Construction parameters
#[derive(Debug, Clone)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct FloorTokenParams {
    /// Account the engine's liquidity shares are credited to
    pub self_address: Address,
    /// Account of the bin-liquidity pair
    pub pair_address: Address,
    /// Account allowed to manage the roof, pausing and ownership
    pub owner: Address,
    /// Bin the floor starts at
    pub floor_id: u32,
    /// Pair's bin step in basis points
    pub bin_step: u32,
    /// Floor tokens minted into each roof bin
    pub floor_per_bin: U256,
    /// Accounts whose balances never count as circulating supply
    /// (fee sinks, treasury)
    pub excluded_from_circulation: Vec<Address>,
}

/// The floor token engine.
///
/// Generic over its collaborators so hosts plug in their own pair and
/// ledger bindings; tests plug in mocks.
pub struct FloorToken<P, L, Q> {
    pub(crate) state: RangeState,
    pub(crate) guard: GuardStatus,
    pub(crate) pair: P,
    pub(crate) ledger: L,
    pub(crate) quote: Q,
    pub(crate) self_address: Address,
    pub(crate) pair_address: Address,
    pub(crate) owner: Address,
    pub(crate) excluded_from_circulation: Vec<Address>,
    pub(crate) events: Vec<FloorEvent>,
}

impl<P, L, Q> FloorToken<P, L, Q>
where
    P: PairGateway,
    L: TokenLedger,
    Q: QuoteToken,
{
    pub fn new(pair: P, ledger: L, quote: Q, params: FloorTokenParams) -> Self {
        FloorToken {
            state: RangeState::new(params.floor_id, params.bin_step, params.floor_per_bin),
            guard: GuardStatus::default(),
            pair,
            ledger,
            quote,
            self_address: params.self_address,
            pair_address: params.pair_address,
            owner: params.owner,
            excluded_from_circulation: params.excluded_from_circulation,
            events: Vec::new(),
        }
    }

    // ========================================================================
    // Guard and Authorization
    // ========================================================================

    /// Run `op` with the reentrancy guard held. The guard is released on
    /// every exit path, including errors.
    pub(crate) fn with_guard<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> FloorResult<T>,
    ) -> FloorResult<T> {
        self.guard.enter()?;
        let result = op(self);
        self.guard.exit();
        result
    }

    pub(crate) fn ensure_owner(&self, caller: Address) -> FloorResult<()> {
        if caller != self.owner {
            return Err(FloorError::Unauthorized);
        }
        Ok(())
    }

    // ========================================================================
    // Pair Accounting Helpers
    // ========================================================================

    /// (token, quote) reserves net of protocol fees
    pub(crate) fn net_reserves(&self) -> (U256, U256) {
        let (raw_token, raw_quote) = self.pair.reserves();
        let (fees_token, fees_quote) = self.pair.protocol_fees();
        (
            raw_token.saturating_sub(&fees_token),
            raw_quote.saturating_sub(&fees_quote),
        )
    }

    /// Floor tokens sitting at the pair beyond its accounted reserves
    pub(crate) fn floor_excess(&self) -> FloorResult<U256> {
        let (raw_token, _) = self.pair.reserves();
        self.ledger
            .balance_of(self.pair_address)
            .checked_sub(&raw_token)
            .ok_or_else(|| MathError::Underflow.into())
    }

    /// Supply that can come back to the pair and demand quote backing:
    /// everything minted, minus what already sits in our bins, minus the
    /// excluded accounts.
    pub(crate) fn circulating_supply(&self, floor_in_pair: &U256) -> FloorResult<U256> {
        let mut circulating = self
            .ledger
            .total_supply()
            .checked_sub(floor_in_pair)
            .ok_or(MathError::Underflow)?;
        for account in &self.excluded_from_circulation {
            circulating = circulating.saturating_sub(&self.ledger.balance_of(*account));
        }
        Ok(circulating)
    }

    /// Highest bin the engine may hold shares in: the roof when raised,
    /// bounded below by the active bin in case the price escaped it. Bins
    /// between a lower roof and the active id hold no engine shares, so the
    /// rebalance snapshot and the queries share this one ceiling.
    pub(crate) fn scan_top(&self, active_id: u32) -> u32 {
        if self.state.roof_id == 0 {
            active_id
        } else {
            self.state.roof_id.max(active_id)
        }
    }

    // ========================================================================
    // Pausing and Ownership
    // ========================================================================

    /// Stand down automatic rebalancing. Owner only.
    pub fn pause_rebalance(&mut self, caller: Address) -> FloorResult<()> {
        self.ensure_owner(caller)?;
        if self.state.rebalance_paused {
            return Err(FloorError::RebalancePaused);
        }
        self.state.rebalance_paused = true;
        self.events.push(FloorEvent::RebalancePaused);
        Ok(())
    }

    /// Resume automatic rebalancing. Owner only. Refused while the active
    /// bin sits above the roof, since the hook would then let transfers out
    /// of the pair bypass the roof check.
    pub fn unpause_rebalance(&mut self, caller: Address) -> FloorResult<()> {
        self.ensure_owner(caller)?;
        if !self.state.rebalance_paused {
            return Err(FloorError::RebalanceNotPaused);
        }
        if self.state.roof_id != 0 && self.pair.active_id() > self.state.roof_id {
            return Err(FloorError::ActiveBinAboveRoof);
        }
        self.state.rebalance_paused = false;
        self.events.push(FloorEvent::RebalanceUnpaused);
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> FloorResult<()> {
        self.ensure_owner(caller)?;
        self.owner = new_owner;
        self.events.push(FloorEvent::OwnershipTransferred { new_owner });
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn floor_id(&self) -> u32 {
        self.state.floor_id
    }

    pub fn roof_id(&self) -> u32 {
        self.state.roof_id
    }

    pub fn bin_step(&self) -> u32 {
        self.state.bin_step
    }

    pub fn floor_per_bin(&self) -> U256 {
        self.state.floor_per_bin
    }

    pub fn rebalance_paused(&self) -> bool {
        self.state.rebalance_paused
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_locked(&self) -> bool {
        self.guard.is_entered()
    }

    /// Guaranteed price in 128.128 fixed point
    pub fn floor_price(&self) -> FloorResult<U256> {
        Ok(price_from_id(self.state.floor_id, self.state.bin_step)?)
    }

    /// (token, quote) amounts redeemable from the engine's bins
    pub fn tokens_in_pair(&self) -> FloorResult<(U256, U256)> {
        let active_id = self.pair.active_id();
        let snapshot = snapshot_range(
            &self.pair,
            self.self_address,
            self.state.floor_id,
            active_id,
            self.scan_top(active_id),
        )?;
        Ok((snapshot.total_floor_in_pair, snapshot.total_quote_in_pair))
    }

    /// Floor id a rebalance would move to right now, without moving it
    pub fn calculate_new_floor_id(&self) -> FloorResult<u32> {
        let active_id = self.pair.active_id();
        let floor_id = self.state.floor_id;
        let roof_id = self.state.roof_id;
        let top_id = self.scan_top(active_id);
        let snapshot = snapshot_range(&self.pair, self.self_address, floor_id, active_id, top_id)?;
        let circulating = self.circulating_supply(&snapshot.total_floor_in_pair)?;
        Ok(floor::calculate_new_floor_id(
            floor_id,
            active_id,
            roof_id,
            self.state.bin_step,
            circulating,
            snapshot.total_quote_in_pair,
            &snapshot.quote_reserves,
        )?)
    }

    /// Hand accumulated events to the host
    pub fn drain_events(&mut self) -> Vec<FloorEvent> {
        std::mem::take(&mut self.events)
    }
}

impl<P, L, Q> TransferHook for FloorToken<P, L, Q>
where
    P: PairGateway,
    L: TokenLedger,
    Q: QuoteToken,
{
    /// Called by the host ledger before floor tokens move.
    ///
    /// Mints and burns pass through untouched. Transfers out of the pair
    /// are refused while the active bin sits above the roof, because the
    /// price would then have no provisioned liquidity behind it. Any other
    /// transfer opportunistically rebalances the floor, unless a guarded
    /// operation is already on the stack.
    fn before_transfer(&mut self, from: Address, to: Address, _amount: U256) -> FloorResult<()> {
        if from.is_zero() || to.is_zero() {
            return Ok(());
        }
        if self.state.rebalance_paused {
            return Ok(());
        }
        if from == self.pair_address {
            if self.state.roof_id != 0 && self.pair.active_id() > self.state.roof_id {
                return Err(FloorError::ActiveBinAboveRoof);
            }
            return Ok(());
        }
        if !self.guard.is_entered() {
            self.rebalance_floor()?;
        }
        Ok(())
    }
}
