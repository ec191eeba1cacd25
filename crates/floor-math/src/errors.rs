//! # Math Error Types

use thiserror::Error;

/// Errors produced by wide-integer and fixed-point operations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum MathError {
    #[error("Math overflow")]
    Overflow,

    #[error("Math underflow")]
    Underflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Mul div overflow")]
    MulDivOverflow,

    #[error("Power underflow")]
    PowUnderflow,

    #[error("Exponent too large")]
    ExponentTooLarge,
}

/// Result type using math errors
pub type MathResult<T> = Result<T, MathError>;
