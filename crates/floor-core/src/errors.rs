//! # Engine Error Types
//!
//! Three classes of failure, mirrored in the variants below:
//! precondition violations (bad caller input, reported before any state
//! change), invariant violations (the external pair behaved unexpectedly
//! mid-operation; fatal, never retried), and wrapped math errors. No-op
//! conditions are not errors and surface as `Ok(false)` from the engine.

use floor_math::MathError;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorError {
    // ========================================================================
    // Precondition Violations
    // ========================================================================

    #[error("Reentrant call")]
    ReentrantCall,

    #[error("Caller is not the owner")]
    Unauthorized,

    #[error("Rebalance is paused")]
    RebalancePaused,

    #[error("Rebalance is not paused")]
    RebalanceNotPaused,

    #[error("Zero bins requested")]
    ZeroBins,

    #[error("Active bin above roof")]
    ActiveBinAboveRoof,

    #[error("New roof too high")]
    RoofTooHigh,

    #[error("Roof too low")]
    RoofTooLow,

    #[error("New roof not above active bin")]
    NewRoofNotAboveActiveBin,

    #[error("New roof below floor bin")]
    NewRoofBelowFloor,

    // ========================================================================
    // Invariant Violations (fatal)
    // ========================================================================

    #[error("Token reserve changed during burn")]
    TokenReserveChanged,

    #[error("Quote reserve changed during burn")]
    QuoteReserveChanged,

    #[error("Pair token balance changed during burn")]
    PairBalanceChanged,

    #[error("Quote tokens added to a token-only mint")]
    InvalidAmounts,

    #[error("Minted amounts broke the rebalance invariant")]
    BrokenInvariant,

    // ========================================================================
    // External Calls
    // ========================================================================

    #[error("Ledger operation rejected: {0}")]
    Ledger(&'static str),

    #[error("Pair operation rejected: {0}")]
    Pair(&'static str),

    // ========================================================================
    // Math
    // ========================================================================

    #[error(transparent)]
    Math(#[from] MathError),
}

/// Result type using engine errors
pub type FloorResult<T> = Result<T, FloorError>;
