//! # Shared Types

use std::fmt;

/// Opaque 32-byte account identifier.
///
/// The engine never interprets the bytes; equality is all it needs. The
/// all-zero address is the mint/burn sentinel used by token ledgers.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The mint/burn sentinel
    pub const ZERO: Address = Address([0u8; 32]);

    pub const fn new(bytes: [u8; 32]) -> Self {
        Address(bytes)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "..)")
    }
}
