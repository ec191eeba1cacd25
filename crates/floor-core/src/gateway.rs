//! # External Collaborator Traits
//!
//! The engine talks to three external systems: the bin-liquidity pair, its
//! own token ledger, and the counter-asset (quote) ledger. Each is reached
//! through a narrow trait so the engine stays host-agnostic and testable.
//!
//! Convention carried throughout: the pair's `reserves()` are RAW totals as
//! the pair reports them and INCLUDE accrued protocol fees. Net reserves are
//! `raw - protocol_fees`, and the pair's pending (unaccounted) balance of a
//! token is `ledger_balance(pair) - raw_reserves`.

use crate::errors::FloorResult;
use crate::types::Address;
use floor_math::U256;

/// Reserves of a single bin, net of any fees
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct BinReserves {
    /// Floor-token side (above the active bin)
    pub token: U256,
    /// Quote side (below the active bin)
    pub quote: U256,
}

/// Amounts the pair actually consumed from its pending balances during a mint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct MintResult {
    pub token_added: U256,
    pub quote_added: U256,
}

/// Read and mutate access to the bin-liquidity pair.
///
/// Mutating calls may hand control to untrusted code; callers re-read any
/// state they depend on afterwards instead of trusting cached values.
pub trait PairGateway {
    /// Id of the bin trades currently execute in
    fn active_id(&self) -> u32;

    /// Reserves sitting in one bin
    fn bin_reserves(&self, id: u32) -> BinReserves;

    /// Liquidity shares `account` holds in bin `id`
    fn share_balance_of(&self, account: Address, id: u32) -> U256;

    /// Total liquidity shares outstanding for bin `id`
    fn share_total_supply(&self, id: u32) -> U256;

    /// Raw (token, quote) reserve totals, protocol fees included
    fn reserves(&self) -> (U256, U256);

    /// Accrued (token, quote) protocol fees
    fn protocol_fees(&self) -> (U256, U256);

    /// Deposit the pair's pending balances into `ids` according to the given
    /// per-bin distributions (scaled by [`crate::constants::PRECISION`]),
    /// crediting the shares to `to`. Returns what was actually consumed.
    fn mint(
        &mut self,
        ids: &[u32],
        token_distribution: &[U256],
        quote_distribution: &[U256],
        to: Address,
    ) -> FloorResult<MintResult>;

    /// Redeem `shares` from `ids`, sending the underlying amounts to `to`
    fn burn(&mut self, ids: &[u32], shares: &[U256], to: Address) -> FloorResult<()>;
}

/// Supply-side access to the floor token's own ledger
pub trait TokenLedger {
    fn total_supply(&self) -> U256;
    fn balance_of(&self, account: Address) -> U256;
    fn mint(&mut self, to: Address, amount: U256) -> FloorResult<()>;
    fn burn(&mut self, from: Address, amount: U256) -> FloorResult<()>;
}

/// Read-only view of the counter-asset ledger
pub trait QuoteToken {
    fn balance_of(&self, account: Address) -> U256;
}

/// Hooks the host ledger calls around supply movements.
///
/// Mints and burns are transfers from and to the zero address; the default
/// hook implementations route them through `before_transfer` accordingly.
pub trait TransferHook {
    fn before_transfer(&mut self, from: Address, to: Address, amount: U256) -> FloorResult<()>;

    fn mint_hook(&mut self, to: Address, amount: U256) -> FloorResult<()> {
        self.before_transfer(Address::ZERO, to, amount)
    }

    fn burn_hook(&mut self, from: Address, amount: U256) -> FloorResult<()> {
        self.before_transfer(from, Address::ZERO, amount)
    }
}
