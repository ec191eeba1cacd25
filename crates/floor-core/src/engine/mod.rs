//! # Rebalancing Engine
//!
//! The floor and roof operations. Pure bin arithmetic lives in free
//! functions so it can be property-tested; the orchestration that talks to
//! the pair lives in `impl` blocks on [`crate::token::FloorToken`].

pub mod floor;
pub mod roof;
pub mod snapshot;
