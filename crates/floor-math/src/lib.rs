//! # Floor Math
//!
//! Mathematical utilities for the floor token engine:
//!
//! - 256-bit unsigned integers with 512-bit intermediates for overflow-free
//!   multiply-then-divide
//! - 128.128 fixed-point bin-price conversions
//! - Rounding-direction-aware shift/divide helpers
//!
//! All fallible entry points return [`MathResult`]; rounding direction is part
//! of the contract of every operation that can lose precision.

pub mod big_int;
pub mod bin_math;
pub mod errors;

// Re-export commonly used items
pub use big_int::{Rounding, U256, U512};
pub use bin_math::*;
pub use errors::{MathError, MathResult};
