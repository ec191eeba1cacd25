//! # Bin Price Math
//!
//! Conversions between bin ids and 128.128 fixed-point prices, plus the
//! rounding-direction-aware multiply/shift helpers the rebalance engine uses
//! to move between token amounts and price units.
//!
//! A bin id encodes a price as `(1 + bin_step / 10_000)^(id - ID_ONE)`, so
//! `ID_ONE` is the bin trading at exactly 1.0. Prices are strictly increasing
//! in the id for any nonzero bin step.

use crate::big_int::{Rounding, U256, U512};
use crate::errors::{MathError, MathResult};

/// Fractional bits of the 128.128 price representation
pub const SCALE_OFFSET: u32 = 128;

/// The bin id whose price is exactly one
pub const ID_ONE: u32 = 1 << 23;

/// Basis points denominator (10,000 = 100%)
pub const BASIS_POINTS: u32 = 10_000;

/// 1.0 in 128.128 fixed point (2^128)
pub const ONE_128X128: U256 = U256 { words: [0, 0, 1, 0] };

/// Largest exponent magnitude accepted by [`pow_128x128`]. Beyond this the
/// result cannot be represented in 128.128 anyway.
const MAX_POW_EXPONENT: u64 = 1 << 20;

/// Price of a bin in 128.128 fixed point: `(1 + bin_step/10_000)^(id - ID_ONE)`.
pub fn price_from_id(id: u32, bin_step: u32) -> MathResult<U256> {
    let base = base_from_bin_step(bin_step)?;
    let exponent = id as i64 - ID_ONE as i64;
    pow_128x128(base, exponent)
}

/// `1 + bin_step / 10_000` in 128.128 fixed point
fn base_from_bin_step(bin_step: u32) -> MathResult<U256> {
    let scaled_step = U256::from_u64(bin_step as u64)
        .checked_shl(SCALE_OFFSET)
        .ok_or(MathError::Overflow)?;
    let fraction = scaled_step
        .checked_div(&U256::from_u64(BASIS_POINTS as u64))
        .ok_or(MathError::DivisionByZero)?;
    ONE_128X128
        .checked_add(&fraction)
        .ok_or(MathError::Overflow)
}

/// Raise a 128.128 value to a signed integer power by square-and-multiply.
///
/// Bases above one are inverted up front so that every intermediate product
/// stays below one and cannot overflow; the inversion is undone at the end.
/// A result that truncates to zero means the true value is below the 128.128
/// resolution and is reported as `PowUnderflow`.
pub fn pow_128x128(x: U256, y: i64) -> MathResult<U256> {
    if y == 0 {
        return Ok(ONE_128X128);
    }

    let mut invert = y < 0;
    let mut exponent = y.unsigned_abs();
    if exponent >= MAX_POW_EXPONENT {
        return Err(MathError::ExponentTooLarge);
    }

    let mut squared = x;
    if x >= ONE_128X128 {
        squared = U256::MAX.checked_div(&x).ok_or(MathError::DivisionByZero)?;
        invert = !invert;
    }

    let mut result = ONE_128X128;
    while exponent != 0 {
        if exponent & 1 != 0 {
            result = mul_shift_round_down(result, squared, SCALE_OFFSET)?;
        }
        exponent >>= 1;
        if exponent != 0 {
            squared = mul_shift_round_down(squared, squared, SCALE_OFFSET)?;
        }
    }

    if result.is_zero() {
        return Err(MathError::PowUnderflow);
    }

    if invert {
        U256::MAX
            .checked_div(&result)
            .ok_or(MathError::DivisionByZero)
    } else {
        Ok(result)
    }
}

/// `(a * b) / denominator` rounded down; never exceeds the exact result.
pub fn mul_div_round_down(a: U256, b: U256, denominator: U256) -> MathResult<U256> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    a.mul_div(&b, &denominator, Rounding::Down)
        .ok_or(MathError::MulDivOverflow)
}

/// `(a * b) / denominator` rounded up; never less than the exact result.
pub fn mul_div_round_up(a: U256, b: U256, denominator: U256) -> MathResult<U256> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    a.mul_div(&b, &denominator, Rounding::Up)
        .ok_or(MathError::MulDivOverflow)
}

/// `(a * b) >> shift` rounded down
pub fn mul_shift_round_down(a: U256, b: U256, shift: u32) -> MathResult<U256> {
    let product = a.full_mul(&b);
    product.shr(shift).to_u256().ok_or(MathError::Overflow)
}

/// `(a * b) >> shift` rounded up
pub fn mul_shift_round_up(a: U256, b: U256, shift: u32) -> MathResult<U256> {
    let product = a.full_mul(&b);
    let mut result = product.shr(shift).to_u256().ok_or(MathError::Overflow)?;
    if product.low_bits_nonzero(shift) {
        result = result.checked_add(&U256::ONE).ok_or(MathError::Overflow)?;
    }
    Ok(result)
}

/// `(a << shift) / denominator` rounded down
pub fn shift_div_round_down(a: U256, shift: u32, denominator: U256) -> MathResult<U256> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let shifted = U512::from_u256(&a).shl(shift);
    let (quotient, _) = shifted
        .div_rem(&denominator)
        .ok_or(MathError::DivisionByZero)?;
    quotient.to_u256().ok_or(MathError::MulDivOverflow)
}
