//! Event definitions
//!
//! The engine accumulates events in an internal buffer; the host drains them
//! after each call and forwards them to whatever emission mechanism it uses.

use crate::types::Address;

/// Notifications produced by state-changing engine operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum FloorEvent {
    /// The floor was raised to a new bin id
    FloorRebalanced { floor_id: u32 },
    /// The roof was raised to a new bin id
    RoofRaised { roof_id: u32 },
    /// The roof was reduced to a new bin id
    RoofReduced { roof_id: u32 },
    /// Automatic rebalancing was paused
    RebalancePaused,
    /// Automatic rebalancing was resumed
    RebalanceUnpaused,
    /// Engine ownership moved to a new account
    OwnershipTransferred { new_owner: Address },
}
