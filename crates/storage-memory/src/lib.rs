//! In-memory storage implementation for Fundtrack.
//!
//! Implements the repository and store traits defined in
//! `fundtrack-core` over plain locked maps. Suitable for tests, demos
//! and single-process deployments that do not need durability; a
//! database-backed crate can replace it without touching the core.

pub mod accounts;
pub mod ledger;
pub mod navs;
pub mod portfolios;
pub mod sync_jobs;

pub use accounts::AccountMemoryRepository;
pub use ledger::TransactionMemoryRepository;
pub use navs::NavMemoryStore;
pub use portfolios::PortfolioMemoryRepository;
pub use sync_jobs::SyncJobMemoryStore;
