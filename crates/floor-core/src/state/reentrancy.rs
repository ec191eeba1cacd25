//! # Reentrancy Guard
//!
//! Every mutating engine operation shares one guard. External calls made
//! while the guard is held (pair mint/burn, ledger mint/burn) may re-enter
//! the host; re-entering a guarded operation fails, and the transfer hook
//! checks the guard instead of recursing.

use crate::errors::{FloorError, FloorResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum GuardStatus {
    #[default]
    NotEntered,
    Entered,
}

impl GuardStatus {
    /// Take the guard, failing if it is already held
    pub fn enter(&mut self) -> FloorResult<()> {
        if *self == GuardStatus::Entered {
            return Err(FloorError::ReentrantCall);
        }
        *self = GuardStatus::Entered;
        Ok(())
    }

    /// Release the guard
    pub fn exit(&mut self) {
        *self = GuardStatus::NotEntered;
    }

    pub fn is_entered(&self) -> bool {
        *self == GuardStatus::Entered
    }
}
