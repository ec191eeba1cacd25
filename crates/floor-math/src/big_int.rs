//! Big integer arithmetic for high-precision liquidity math.
//!
//! Token amounts and 128.128 prices are 256-bit quantities, so every
//! multiply-then-divide goes through a 512-bit intermediate to avoid losing
//! precision or overflowing. `U256` is 4x64-bit words, least significant
//! first; `U512` is the 8-word intermediate with a full 512-by-256-bit
//! division.

use std::cmp::Ordering;

// ============================================================================
// Type Definitions
// ============================================================================

/// Rounding modes for financial calculations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum Rounding {
    /// Floor - round towards zero
    Down,
    /// Ceiling - round away from zero
    Up,
}

/// U256 implementation using 4x64-bit words
/// Layout: [least_significant, ..., most_significant]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct U256 {
    pub words: [u64; 4],
}

impl U256 {
    pub const ZERO: U256 = U256 { words: [0; 4] };
    pub const ONE: U256 = U256 { words: [1, 0, 0, 0] };
    pub const MAX: U256 = U256 { words: [u64::MAX; 4] };

    /// Create U256 from u64
    pub const fn from_u64(value: u64) -> Self {
        U256 { words: [value, 0, 0, 0] }
    }

    /// Create U256 from u128
    pub const fn from_u128(value: u128) -> Self {
        U256 {
            words: [value as u64, (value >> 64) as u64, 0, 0],
        }
    }

    /// Convert to u128 if possible
    pub fn to_u128(&self) -> Option<u128> {
        if self.words[2] != 0 || self.words[3] != 0 {
            return None;
        }
        Some(((self.words[1] as u128) << 64) | self.words[0] as u128)
    }

    /// Convert to u64 if possible
    pub fn to_u64(&self) -> Option<u64> {
        if self.words[1] != 0 || self.words[2] != 0 || self.words[3] != 0 {
            return None;
        }
        Some(self.words[0])
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&word| word == 0)
    }

    /// Addition with overflow checking
    pub fn checked_add(&self, other: &U256) -> Option<U256> {
        let mut result = U256::ZERO;
        let mut carry = 0u64;

        for i in 0..4 {
            let (sum1, overflow1) = self.words[i].overflowing_add(other.words[i]);
            let (sum2, overflow2) = sum1.overflowing_add(carry);

            result.words[i] = sum2;
            carry = u64::from(overflow1) + u64::from(overflow2);
        }

        if carry != 0 {
            None
        } else {
            Some(result)
        }
    }

    /// Subtraction with underflow checking
    pub fn checked_sub(&self, other: &U256) -> Option<U256> {
        if self < other {
            return None;
        }

        let mut result = U256::ZERO;
        let mut borrow = 0u64;

        for i in 0..4 {
            let (diff1, underflow1) = self.words[i].overflowing_sub(other.words[i]);
            let (diff2, underflow2) = diff1.overflowing_sub(borrow);

            result.words[i] = diff2;
            borrow = u64::from(underflow1) + u64::from(underflow2);
        }

        Some(result)
    }

    /// Subtraction clamped at zero
    pub fn saturating_sub(&self, other: &U256) -> U256 {
        self.checked_sub(other).unwrap_or(U256::ZERO)
    }

    /// Multiplication returning U512 to prevent overflow
    pub fn full_mul(&self, other: &U256) -> U512 {
        let mut words = [0u64; 8];

        for i in 0..4 {
            if self.words[i] == 0 {
                continue;
            }

            let mut carry = 0u128;
            for j in 0..4 {
                let acc = words[i + j] as u128
                    + (self.words[i] as u128) * (other.words[j] as u128)
                    + carry;
                words[i + j] = acc as u64;
                carry = acc >> 64;
            }
            words[i + 4] = carry as u64;
        }

        U512 { words }
    }

    /// Checked multiplication with overflow detection
    pub fn checked_mul(&self, other: &U256) -> Option<U256> {
        self.full_mul(other).to_u256()
    }

    /// Checked division, `None` on a zero divisor
    pub fn checked_div(&self, other: &U256) -> Option<U256> {
        let (quotient, _) = U512::from_u256(self).div_rem(other)?;
        // A U256 dividend always yields a U256 quotient
        quotient.to_u256()
    }

    /// High-precision multiply-divide: `(self * numerator) / denominator`
    /// with a 512-bit intermediate product.
    pub fn mul_div(&self, numerator: &U256, denominator: &U256, rounding: Rounding) -> Option<U256> {
        let product = self.full_mul(numerator);
        let (quotient, remainder) = product.div_rem(denominator)?;

        let quotient = quotient.to_u256()?;
        if rounding == Rounding::Up && !remainder.is_zero() {
            return quotient.checked_add(&U256::ONE);
        }

        Some(quotient)
    }

    /// Left shift with overflow checking
    pub fn checked_shl(&self, shift: u32) -> Option<U256> {
        if shift >= 256 {
            return None;
        }
        let wide = U512::from_u256(self).shl(shift);
        wide.to_u256()
    }

    /// Right shift
    pub fn shr(&self, shift: u32) -> U256 {
        if shift >= 256 {
            return U256::ZERO;
        }
        if shift == 0 {
            return *self;
        }

        let word_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;

        let mut result = U256::ZERO;
        for i in word_shift..4 {
            result.words[i - word_shift] = self.words[i];
        }

        if bit_shift > 0 {
            for i in 0..(4 - word_shift) {
                result.words[i] >>= bit_shift;
                if i + 1 < 4 {
                    result.words[i] |= result.words[i + 1] << (64 - bit_shift);
                }
            }
        }

        result
    }

    /// Number of leading zero bits
    pub fn leading_zeros(&self) -> u32 {
        for i in (0..4).rev() {
            if self.words[i] != 0 {
                return (3 - i as u32) * 64 + self.words[i].leading_zeros();
            }
        }
        256
    }
}

// ============================================================================
// 512-bit Intermediate
// ============================================================================

/// U512 for intermediate calculations
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct U512 {
    pub words: [u64; 8],
}

impl U512 {
    pub const ZERO: U512 = U512 { words: [0; 8] };

    /// Widen a U256 into the low half
    pub fn from_u256(value: &U256) -> Self {
        let mut words = [0u64; 8];
        words[..4].copy_from_slice(&value.words);
        U512 { words }
    }

    /// Convert to U256 if the high half is zero
    pub fn to_u256(&self) -> Option<U256> {
        if self.words[4..8].iter().any(|&word| word != 0) {
            return None;
        }
        Some(U256 {
            words: [self.words[0], self.words[1], self.words[2], self.words[3]],
        })
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&word| word == 0)
    }

    /// Test a single bit
    fn bit(&self, index: u32) -> bool {
        (self.words[(index / 64) as usize] >> (index % 64)) & 1 == 1
    }

    /// Number of leading zero bits
    fn leading_zeros(&self) -> u32 {
        for i in (0..8).rev() {
            if self.words[i] != 0 {
                return (7 - i as u32) * 64 + self.words[i].leading_zeros();
            }
        }
        512
    }

    /// Any bit below `shift` set? Decides the round-up case after a shift.
    pub fn low_bits_nonzero(&self, shift: u32) -> bool {
        let full_words = (shift / 64) as usize;
        let bit_rem = shift % 64;

        for word in self.words.iter().take(full_words.min(8)) {
            if *word != 0 {
                return true;
            }
        }
        if bit_rem > 0 && full_words < 8 && self.words[full_words] & ((1u64 << bit_rem) - 1) != 0 {
            return true;
        }
        false
    }

    /// Left shift, truncating bits shifted past 512
    pub fn shl(&self, shift: u32) -> U512 {
        if shift >= 512 {
            return U512::ZERO;
        }
        if shift == 0 {
            return *self;
        }

        let word_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;

        let mut result = U512::ZERO;
        for i in (word_shift..8).rev() {
            result.words[i] = self.words[i - word_shift];
        }

        if bit_shift > 0 {
            for i in (0..8).rev() {
                result.words[i] <<= bit_shift;
                if i > 0 {
                    result.words[i] |= result.words[i - 1] >> (64 - bit_shift);
                }
            }
        }

        result
    }

    /// Right shift
    pub fn shr(&self, shift: u32) -> U512 {
        if shift >= 512 {
            return U512::ZERO;
        }
        if shift == 0 {
            return *self;
        }

        let word_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;

        let mut result = U512::ZERO;
        for i in word_shift..8 {
            result.words[i - word_shift] = self.words[i];
        }

        if bit_shift > 0 {
            for i in 0..(8 - word_shift) {
                result.words[i] >>= bit_shift;
                if i + 1 < 8 {
                    result.words[i] |= result.words[i + 1] << (64 - bit_shift);
                }
            }
        }

        result
    }

    /// Subtraction with underflow checking
    fn checked_sub(&self, other: &U512) -> Option<U512> {
        let mut result = U512::ZERO;
        let mut borrow = 0u64;

        for i in 0..8 {
            let (diff1, underflow1) = self.words[i].overflowing_sub(other.words[i]);
            let (diff2, underflow2) = diff1.overflowing_sub(borrow);

            result.words[i] = diff2;
            borrow = u64::from(underflow1) + u64::from(underflow2);
        }

        if borrow != 0 {
            None
        } else {
            Some(result)
        }
    }

    /// Divide by a U256, returning quotient and remainder.
    /// Shift-subtract long division over the dividend's significant bits;
    /// the remainder always fits in a U256 since it is less than the divisor.
    pub fn div_rem(&self, divisor: &U256) -> Option<(U512, U256)> {
        if divisor.is_zero() {
            return None;
        }

        let divisor_wide = U512::from_u256(divisor);
        if *self < divisor_wide {
            // High half is zero whenever self < divisor
            let remainder = self.to_u256()?;
            return Some((U512::ZERO, remainder));
        }

        let mut quotient = U512::ZERO;
        let mut remainder = U512::ZERO;
        let significant_bits = 512 - self.leading_zeros();

        for index in (0..significant_bits).rev() {
            remainder = remainder.shl(1);
            if self.bit(index) {
                remainder.words[0] |= 1;
            }
            if let Some(reduced) = remainder.checked_sub(&divisor_wide) {
                remainder = reduced;
                quotient.words[(index / 64) as usize] |= 1u64 << (index % 64);
            }
        }

        let remainder = remainder.to_u256()?;
        Some((quotient, remainder))
    }
}

impl PartialOrd for U512 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for U512 {
    fn cmp(&self, other: &Self) -> Ordering {
        for i in (0..8).rev() {
            match self.words[i].cmp(&other.words[i]) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }
}

// ============================================================================
// Operators and Conversions
// ============================================================================

use std::ops::{Add, Mul, Shl, Shr, Sub};

impl Add for U256 {
    type Output = U256;

    fn add(self, other: U256) -> U256 {
        self.checked_add(&other).expect("U256 addition overflow")
    }
}

impl Sub for U256 {
    type Output = U256;

    fn sub(self, other: U256) -> U256 {
        self.checked_sub(&other).expect("U256 subtraction underflow")
    }
}

impl Mul for U256 {
    type Output = U256;

    fn mul(self, other: U256) -> U256 {
        self.checked_mul(&other).expect("U256 multiplication overflow")
    }
}

impl Shl<u32> for U256 {
    type Output = U256;

    fn shl(self, shift: u32) -> U256 {
        self.checked_shl(shift).expect("U256 shift left overflow")
    }
}

impl Shr<u32> for U256 {
    type Output = U256;

    fn shr(self, shift: u32) -> U256 {
        U256::shr(&self, shift)
    }
}

impl From<u64> for U256 {
    fn from(value: u64) -> Self {
        U256::from_u64(value)
    }
}

impl From<u128> for U256 {
    fn from(value: u128) -> Self {
        U256::from_u128(value)
    }
}

impl TryFrom<U256> for u128 {
    type Error = ();

    fn try_from(value: U256) -> Result<u128, ()> {
        value.to_u128().ok_or(())
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> Ordering {
        for i in (0..4).rev() {
            match self.words[i].cmp(&other.words[i]) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }
}
