//! # Engine State

pub mod range;
pub mod reentrancy;
