//! # Floor Core - Price Floor Engine
//!
//! This crate maintains a price-floor guarantee for a token whose liquidity
//! lives in the discrete price bins of an external AMM pair. As the pair's
//! active bin rises, the engine consolidates the bins below it so the token
//! can never trade under the price backed by its accumulated counter-asset
//! reserves; a roof mechanism pre-provisions token-only liquidity above the
//! current price and reclaims it later.
//!
//! The engine is host-agnostic: the AMM pair and the two token ledgers are
//! reached through narrow traits ([`PairGateway`], [`TokenLedger`],
//! [`QuoteToken`]) and treated as possibly-reentrant collaborators. Every
//! mutating operation runs inside a shared reentrancy guard and re-reads any
//! pair state it depends on after each external call.
//!
//! ## Feature Flags
//!
//! - `client`: Enables standard serialization for off-chain use

pub mod constants;
pub mod engine;
pub mod errors;
pub mod events;
pub mod gateway;
pub mod state;
pub mod token;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use engine::floor::calculate_new_floor_id;
pub use engine::snapshot::BinSnapshot;
pub use errors::{FloorError, FloorResult};
pub use events::FloorEvent;
pub use gateway::{BinReserves, MintResult, PairGateway, QuoteToken, TokenLedger, TransferHook};
pub use state::range::RangeState;
pub use state::reentrancy::GuardStatus;
pub use token::{FloorToken, FloorTokenParams};
pub use types::Address;

// The math crate is part of the public API surface
pub use floor_math::{U256, U512};
