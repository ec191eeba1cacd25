//! Shared mock collaborators for integration tests.
//!
//! The mocks model the external pair and ledgers faithfully enough for the
//! engine's accounting to hold: per-bin reserves with proportional share
//! redemption, raw reserve totals that include protocol fees, and mints
//! that pull from the pair's pending (unaccounted) balances.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use floor_core::{
    Address, BinReserves, FloorError, FloorResult, FloorToken, FloorTokenParams, MintResult,
    PairGateway, QuoteToken, TokenLedger, PRECISION, U256,
};
use floor_math::bin_math::{mul_div_round_down, ID_ONE};

pub const PAIR: Address = Address::new([1; 32]);
pub const TOKEN: Address = Address::new([2; 32]);
pub const OWNER: Address = Address::new([3; 32]);
pub const TREASURY: Address = Address::new([4; 32]);
pub const ALICE: Address = Address::new([5; 32]);
pub const BOB: Address = Address::new([6; 32]);

pub fn u(value: u128) -> U256 {
    U256::from_u128(value)
}

// ============================================================================
// Ledgers
// ============================================================================

#[derive(Default)]
pub struct LedgerState {
    pub balances: BTreeMap<Address, U256>,
    pub total_supply: U256,
}

impl LedgerState {
    fn credit(&mut self, to: Address, amount: U256) {
        let entry = self.balances.entry(to).or_insert(U256::ZERO);
        *entry = entry.checked_add(&amount).unwrap();
    }

    fn debit(&mut self, from: Address, amount: U256) -> Result<(), &'static str> {
        let entry = self.balances.entry(from).or_insert(U256::ZERO);
        *entry = entry.checked_sub(&amount).ok_or("insufficient balance")?;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockLedger(pub Rc<RefCell<LedgerState>>);

impl MockLedger {
    pub fn balance(&self, account: Address) -> U256 {
        self.0
            .borrow()
            .balances
            .get(&account)
            .copied()
            .unwrap_or(U256::ZERO)
    }

    pub fn supply(&self) -> U256 {
        self.0.borrow().total_supply
    }

    /// Seed a balance without going through the engine
    pub fn mint_raw(&self, to: Address, amount: U256) {
        let mut state = self.0.borrow_mut();
        state.credit(to, amount);
        state.total_supply = state.total_supply.checked_add(&amount).unwrap();
    }

    pub fn transfer(&self, from: Address, to: Address, amount: U256) {
        let mut state = self.0.borrow_mut();
        state.debit(from, amount).unwrap();
        state.credit(to, amount);
    }
}

impl TokenLedger for MockLedger {
    fn total_supply(&self) -> U256 {
        self.0.borrow().total_supply
    }

    fn balance_of(&self, account: Address) -> U256 {
        self.balance(account)
    }

    fn mint(&mut self, to: Address, amount: U256) -> FloorResult<()> {
        self.mint_raw(to, amount);
        Ok(())
    }

    fn burn(&mut self, from: Address, amount: U256) -> FloorResult<()> {
        let mut state = self.0.borrow_mut();
        state
            .debit(from, amount)
            .map_err(FloorError::Ledger)?;
        state.total_supply = state.total_supply.checked_sub(&amount).unwrap();
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockQuote(pub Rc<RefCell<LedgerState>>);

impl MockQuote {
    pub fn balance(&self, account: Address) -> U256 {
        self.0
            .borrow()
            .balances
            .get(&account)
            .copied()
            .unwrap_or(U256::ZERO)
    }

    pub fn mint_raw(&self, to: Address, amount: U256) {
        let mut state = self.0.borrow_mut();
        state.credit(to, amount);
        state.total_supply = state.total_supply.checked_add(&amount).unwrap();
    }

    fn transfer(&self, from: Address, to: Address, amount: U256) {
        let mut state = self.0.borrow_mut();
        state.debit(from, amount).unwrap();
        state.credit(to, amount);
    }
}

impl QuoteToken for MockQuote {
    fn balance_of(&self, account: Address) -> U256 {
        self.balance(account)
    }
}

// ============================================================================
// Pair
// ============================================================================

#[derive(Default)]
pub struct Bin {
    pub token: U256,
    pub quote: U256,
    pub total_shares: U256,
    pub holdings: BTreeMap<Address, U256>,
}

/// Fault injection for the pair mock. Each variant makes mutating calls
/// misbehave the way a hostile or buggy pair would, so tests can check the
/// engine's post-call invariant checks one by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Misbehavior {
    #[default]
    None,
    /// `burn` also skims a token reserve out of an untouched bin
    SkimTokenReserveOnBurn,
    /// `burn` also accrues a quote protocol fee
    SkimQuoteFeesOnBurn,
    /// `burn` also moves part of the pair's floor-token ledger balance away
    LeakPairBalanceOnBurn,
    /// `mint` reports token consumed on a quote-only deposit
    AddTokenOnMint,
    /// `mint` reports quote consumed on a token-only deposit
    AddQuoteOnMint,
    /// `mint` under-reports the quote it consumed
    ShortQuoteOnMint,
}

#[derive(Default)]
pub struct PairState {
    pub active_id: u32,
    pub bins: BTreeMap<u32, Bin>,
    pub fees: (U256, U256),
    pub misbehavior: Misbehavior,
}

/// Bin-liquidity pair mock. Raw reserve totals include protocol fees, and
/// token balances credited to [`PAIR`] beyond those totals are the pending
/// amounts a mint may consume.
#[derive(Clone)]
pub struct MockPair {
    pub state: Rc<RefCell<PairState>>,
    pub token_ledger: MockLedger,
    pub quote_ledger: MockQuote,
}

impl MockPair {
    pub fn new(token_ledger: MockLedger, quote_ledger: MockQuote) -> Self {
        MockPair {
            state: Rc::new(RefCell::new(PairState::default())),
            token_ledger,
            quote_ledger,
        }
    }

    pub fn set_active(&self, id: u32) {
        self.state.borrow_mut().active_id = id;
    }

    pub fn set_misbehavior(&self, misbehavior: Misbehavior) {
        self.state.borrow_mut().misbehavior = misbehavior;
    }

    pub fn bin(&self, id: u32) -> (U256, U256, U256) {
        let state = self.state.borrow();
        match state.bins.get(&id) {
            Some(bin) => (bin.token, bin.quote, bin.total_shares),
            None => (U256::ZERO, U256::ZERO, U256::ZERO),
        }
    }

    /// Pending quote at the pair, beyond its accounted reserves
    pub fn quote_excess(&self) -> U256 {
        let (_, raw_quote) = self.raw_reserves();
        self.quote_ledger
            .balance(PAIR)
            .checked_sub(&raw_quote)
            .unwrap()
    }

    /// Simulate traders buying out a bin: its token side leaves to `buyer`
    /// and `quote_in` takes its place.
    pub fn convert_bin_to_quote(&self, id: u32, quote_in: U256, buyer: Address) {
        let mut state = self.state.borrow_mut();
        let bin = state.bins.get_mut(&id).expect("bin not seeded");
        let token_out = bin.token;
        bin.token = U256::ZERO;
        bin.quote = bin.quote.checked_add(&quote_in).unwrap();
        drop(state);
        self.token_ledger.transfer(PAIR, buyer, token_out);
        self.quote_ledger.mint_raw(PAIR, quote_in);
    }

    fn raw_reserves(&self) -> (U256, U256) {
        let state = self.state.borrow();
        let mut token = state.fees.0;
        let mut quote = state.fees.1;
        for bin in state.bins.values() {
            token = token.checked_add(&bin.token).unwrap();
            quote = quote.checked_add(&bin.quote).unwrap();
        }
        (token, quote)
    }
}

impl PairGateway for MockPair {
    fn active_id(&self) -> u32 {
        self.state.borrow().active_id
    }

    fn bin_reserves(&self, id: u32) -> BinReserves {
        let (token, quote, _) = self.bin(id);
        BinReserves { token, quote }
    }

    fn share_balance_of(&self, account: Address, id: u32) -> U256 {
        let state = self.state.borrow();
        state
            .bins
            .get(&id)
            .and_then(|bin| bin.holdings.get(&account))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    fn share_total_supply(&self, id: u32) -> U256 {
        self.bin(id).2
    }

    fn reserves(&self) -> (U256, U256) {
        self.raw_reserves()
    }

    fn protocol_fees(&self) -> (U256, U256) {
        self.state.borrow().fees
    }

    fn mint(
        &mut self,
        ids: &[u32],
        token_distribution: &[U256],
        quote_distribution: &[U256],
        to: Address,
    ) -> FloorResult<MintResult> {
        let misbehavior = self.state.borrow().misbehavior;
        let (raw_token, raw_quote) = self.raw_reserves();
        let pending_token = self
            .token_ledger
            .balance(PAIR)
            .saturating_sub(&raw_token);
        let pending_quote = self
            .quote_ledger
            .balance(PAIR)
            .saturating_sub(&raw_quote);

        let mut result = MintResult::default();
        let mut state = self.state.borrow_mut();
        for (index, &id) in ids.iter().enumerate() {
            let token_in =
                mul_div_round_down(pending_token, token_distribution[index], PRECISION).unwrap();
            let quote_in =
                mul_div_round_down(pending_quote, quote_distribution[index], PRECISION).unwrap();
            if token_in.is_zero() && quote_in.is_zero() {
                continue;
            }

            let bin = state.bins.entry(id).or_default();
            let contributed = token_in.checked_add(&quote_in).unwrap();
            let shares = if bin.total_shares.is_zero() {
                contributed
            } else {
                let liquidity = bin.token.checked_add(&bin.quote).unwrap();
                mul_div_round_down(contributed, bin.total_shares, liquidity).unwrap()
            };

            bin.token = bin.token.checked_add(&token_in).unwrap();
            bin.quote = bin.quote.checked_add(&quote_in).unwrap();
            bin.total_shares = bin.total_shares.checked_add(&shares).unwrap();
            let holding = bin.holdings.entry(to).or_insert(U256::ZERO);
            *holding = holding.checked_add(&shares).unwrap();

            result.token_added = result.token_added.checked_add(&token_in).unwrap();
            result.quote_added = result.quote_added.checked_add(&quote_in).unwrap();
        }

        match misbehavior {
            Misbehavior::AddTokenOnMint => {
                result.token_added = result.token_added.checked_add(&u(1)).unwrap();
            }
            Misbehavior::AddQuoteOnMint => {
                result.quote_added = result.quote_added.checked_add(&u(1)).unwrap();
            }
            Misbehavior::ShortQuoteOnMint => {
                result.quote_added = result.quote_added.saturating_sub(&u(1));
            }
            _ => {}
        }

        Ok(result)
    }

    fn burn(&mut self, ids: &[u32], shares: &[U256], to: Address) -> FloorResult<()> {
        let misbehavior = self.state.borrow().misbehavior;
        let mut token_out = U256::ZERO;
        let mut quote_out = U256::ZERO;
        {
            let mut state = self.state.borrow_mut();
            for (index, &id) in ids.iter().enumerate() {
                let share = shares[index];
                if share.is_zero() {
                    continue;
                }
                let bin = state
                    .bins
                    .get_mut(&id)
                    .ok_or(FloorError::Pair("unknown bin"))?;
                // The caller burns its own shares; the engine is the only
                // caller here and always holds as [`TOKEN`].
                let held = bin.holdings.entry(TOKEN).or_insert(U256::ZERO);
                *held = held
                    .checked_sub(&share)
                    .ok_or(FloorError::Pair("insufficient shares"))?;

                let token_amount = mul_div_round_down(share, bin.token, bin.total_shares).unwrap();
                let quote_amount = mul_div_round_down(share, bin.quote, bin.total_shares).unwrap();
                bin.token = bin.token.checked_sub(&token_amount).unwrap();
                bin.quote = bin.quote.checked_sub(&quote_amount).unwrap();
                bin.total_shares = bin.total_shares.checked_sub(&share).unwrap();

                token_out = token_out.checked_add(&token_amount).unwrap();
                quote_out = quote_out.checked_add(&quote_amount).unwrap();
            }

            match misbehavior {
                Misbehavior::SkimTokenReserveOnBurn => {
                    if let Some(bin) = state.bins.values_mut().rev().find(|bin| !bin.token.is_zero())
                    {
                        bin.token = bin.token.checked_sub(&u(1)).unwrap();
                    }
                }
                Misbehavior::SkimQuoteFeesOnBurn => {
                    state.fees.1 = state.fees.1.checked_add(&u(1)).unwrap();
                }
                _ => {}
            }
        }
        if misbehavior == Misbehavior::LeakPairBalanceOnBurn {
            self.token_ledger.transfer(PAIR, ALICE, u(1));
        }

        if to != PAIR {
            if !token_out.is_zero() {
                self.token_ledger.transfer(PAIR, to, token_out);
            }
            if !quote_out.is_zero() {
                self.quote_ledger.transfer(PAIR, to, quote_out);
            }
        }
        Ok(())
    }
}

// ============================================================================
// Setup
// ============================================================================

pub type TestToken = FloorToken<MockPair, MockLedger, MockQuote>;

pub fn setup(floor_id: u32, bin_step: u32, floor_per_bin: U256) -> (TestToken, MockPair) {
    let token_ledger = MockLedger::default();
    let quote_ledger = MockQuote::default();
    let pair = MockPair::new(token_ledger.clone(), quote_ledger.clone());
    pair.set_active(floor_id);

    let params = FloorTokenParams {
        self_address: TOKEN,
        pair_address: PAIR,
        owner: OWNER,
        floor_id,
        bin_step,
        floor_per_bin,
        excluded_from_circulation: vec![TREASURY],
    };
    let token = FloorToken::new(pair.clone(), token_ledger, quote_ledger, params);
    (token, pair)
}

/// Raise a 10-bin roof, then simulate trading that buys out the first five
/// bins and moves the active id five bins up.
pub fn climb_setup() -> (TestToken, MockPair) {
    let (mut token, pair) = setup(ID_ONE, 25, u(100_000));
    token.raise_roof(OWNER, 10).unwrap();
    for offset in 0..5 {
        pair.convert_bin_to_quote(ID_ONE + offset, u(102_000), ALICE);
    }
    pair.set_active(ID_ONE + 5);
    (token, pair)
}
