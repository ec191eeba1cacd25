//! # Roof Management
//!
//! The roof pre-provisions token-only liquidity in the bins above the
//! current price so trading can climb without the owner minting on demand.
//! Raising appends bins above the current roof; reducing burns the topmost
//! bins and retires the floor tokens they held.

use crate::constants::PRECISION;
use crate::errors::{FloorError, FloorResult};
use crate::events::FloorEvent;
use crate::gateway::{PairGateway, QuoteToken, TokenLedger};
use crate::token::FloorToken;
use crate::types::Address;
use floor_math::{MathError, U256};

/// Bin ids are 24-bit in the pair
const MAX_BIN_ID: u32 = (1 << 24) - 1;

impl<P, L, Q> FloorToken<P, L, Q>
where
    P: PairGateway,
    L: TokenLedger,
    Q: QuoteToken,
{
    /// Extend the roof upward by `nb_bins` bins, minting `floor_per_bin`
    /// fresh tokens into each. Owner only.
    pub fn raise_roof(&mut self, caller: Address, nb_bins: u32) -> FloorResult<()> {
        self.ensure_owner(caller)?;
        self.with_guard(|token| token.raise_roof_inner(nb_bins))
    }

    fn raise_roof_inner(&mut self, nb_bins: u32) -> FloorResult<()> {
        if nb_bins == 0 {
            return Err(FloorError::ZeroBins);
        }
        let roof_id = self.state.roof_id;
        if roof_id != 0 && self.pair.active_id() > roof_id {
            return Err(FloorError::ActiveBinAboveRoof);
        }

        // A zero roof means it was never raised; the first raise starts at
        // the floor bin itself.
        let next_id = if roof_id == 0 {
            self.state.floor_id
        } else {
            roof_id + 1
        };
        let new_roof_id = next_id
            .checked_add(nb_bins - 1)
            .filter(|id| *id <= MAX_BIN_ID)
            .ok_or(FloorError::RoofTooHigh)?;

        let nb_bins_wide = U256::from_u64(nb_bins as u64);
        let share_per_bin = PRECISION
            .checked_div(&nb_bins_wide)
            .ok_or(MathError::DivisionByZero)?;
        let floor_amount = self
            .state
            .floor_per_bin
            .checked_mul(&nb_bins_wide)
            .ok_or(MathError::Overflow)?;

        let ids: Vec<u32> = (next_id..=new_roof_id).collect();
        let token_distribution = vec![share_per_bin; nb_bins as usize];
        let quote_distribution = vec![U256::ZERO; nb_bins as usize];

        // Tokens already sitting unaccounted at the pair (transfer dust,
        // aborted deposits) count toward the deposit; mint or burn only the
        // difference.
        let previous_balance = self.floor_excess()?;
        if previous_balance > floor_amount {
            let surplus = previous_balance
                .checked_sub(&floor_amount)
                .ok_or(MathError::Underflow)?;
            self.ledger.burn(self.pair_address, surplus)?;
        } else if floor_amount > previous_balance {
            let shortfall = floor_amount
                .checked_sub(&previous_balance)
                .ok_or(MathError::Underflow)?;
            self.ledger.mint(self.pair_address, shortfall)?;
        }

        let minted = self.pair.mint(
            &ids,
            &token_distribution,
            &quote_distribution,
            self.self_address,
        )?;
        if !minted.quote_added.is_zero() {
            return Err(FloorError::InvalidAmounts);
        }

        // Rounding in the per-bin distribution can leave a remainder at the
        // pair. Restore the pre-raise excess exactly.
        let leftover = if minted.token_added == floor_amount {
            U256::ZERO
        } else {
            self.floor_excess()?
        };
        if leftover > previous_balance {
            let surplus = leftover
                .checked_sub(&previous_balance)
                .ok_or(MathError::Underflow)?;
            self.ledger.burn(self.pair_address, surplus)?;
        } else if previous_balance > leftover {
            let shortfall = previous_balance
                .checked_sub(&leftover)
                .ok_or(MathError::Underflow)?;
            self.ledger.mint(self.pair_address, shortfall)?;
        }

        self.state.roof_id = new_roof_id;
        self.events.push(FloorEvent::RoofRaised {
            roof_id: new_roof_id,
        });
        Ok(())
    }

    /// Pull the roof down by `nb_bins` bins, burning the floor tokens the
    /// removed bins held. Owner only.
    pub fn reduce_roof(&mut self, caller: Address, nb_bins: u32) -> FloorResult<()> {
        self.ensure_owner(caller)?;
        self.with_guard(|token| token.reduce_roof_inner(nb_bins))
    }

    fn reduce_roof_inner(&mut self, nb_bins: u32) -> FloorResult<()> {
        if nb_bins == 0 {
            return Err(FloorError::ZeroBins);
        }
        let roof_id = self.state.roof_id;
        if roof_id <= nb_bins {
            return Err(FloorError::RoofTooLow);
        }
        let new_roof_id = roof_id - nb_bins;
        if new_roof_id <= self.pair.active_id() {
            return Err(FloorError::NewRoofNotAboveActiveBin);
        }
        if new_roof_id < self.state.floor_id {
            return Err(FloorError::NewRoofBelowFloor);
        }

        let mut ids = Vec::with_capacity(nb_bins as usize);
        let mut shares = Vec::with_capacity(nb_bins as usize);
        for offset in 0..nb_bins {
            let id = roof_id - offset;
            ids.push(id);
            shares.push(self.pair.share_balance_of(self.self_address, id));
        }

        let (_, quote_reserve_before) = self.net_reserves();
        let (_, quote_fees_before) = self.pair.protocol_fees();
        let floor_balance_before = self.ledger.balance_of(self.pair_address);
        let excess_before = self.floor_excess()?;

        // Redeemed floor tokens land back at the pair address, so the
        // pair's ledger balance must not move; only its excess grows.
        self.pair.burn(&ids, &shares, self.pair_address)?;

        let (_, quote_reserve_after) = self.net_reserves();
        let (_, quote_fees_after) = self.pair.protocol_fees();
        if quote_reserve_after != quote_reserve_before || quote_fees_after != quote_fees_before {
            return Err(FloorError::QuoteReserveChanged);
        }
        if self.ledger.balance_of(self.pair_address) != floor_balance_before {
            return Err(FloorError::PairBalanceChanged);
        }

        let excess_after = self.floor_excess()?;
        if excess_after > excess_before {
            let freed = excess_after
                .checked_sub(&excess_before)
                .ok_or(MathError::Underflow)?;
            self.ledger.burn(self.pair_address, freed)?;
        }

        self.state.roof_id = new_roof_id;
        self.events.push(FloorEvent::RoofReduced {
            roof_id: new_roof_id,
        });
        Ok(())
    }
}
