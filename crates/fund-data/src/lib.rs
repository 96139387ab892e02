//! Fund NAV data sources.
//!
//! This crate abstracts the external services that publish fund net-asset-value
//! history. The core crate consumes the `FundDataProvider` trait and never
//! talks to a concrete endpoint directly.

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::FundDataError;
pub use models::{FundProfile, NavQuote};
pub use provider::{EastmoneyProvider, FixtureProvider, FundDataProvider};
