//! Fundtrack Core - Domain entities, services, and traits.
//!
//! This crate contains the position/valuation ledger and the NAV
//! synchronization scheduler. It is storage-agnostic: persistence is
//! consumed through repository and store traits implemented elsewhere
//! (e.g. by the `storage-memory` crate).

pub mod accounts;
pub mod constants;
pub mod errors;
pub mod ledger;
pub mod navs;
pub mod portfolios;
pub mod positions;
pub mod sync;
pub mod valuation;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
