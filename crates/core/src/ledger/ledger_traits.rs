//! Ledger repository and service traits.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::ledger_model::{NewTransaction, Transaction};
use crate::errors::Result;

/// Trait defining the contract for transaction ledger storage.
///
/// The ledger is append-only: there is no update and no per-entry delete.
/// Corrections are recorded as offsetting entries by the service layer.
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    /// Appends a transaction and assigns it an ID, a sequence number and a
    /// creation timestamp. `reverses` links a reversal entry to the
    /// original it offsets.
    async fn append(
        &self,
        new_transaction: NewTransaction,
        reverses: Option<String>,
    ) -> Result<Transaction>;

    /// Retrieves a transaction by its ID.
    fn get_by_id(&self, transaction_id: &str) -> Result<Transaction>;

    /// Lists a portfolio's transactions ordered by trade date, then by
    /// insertion sequence. Optionally restricted to one fund and/or to
    /// entries with a trade date on or before `as_of`.
    fn list(
        &self,
        portfolio_id: &str,
        fund_id: Option<&str>,
        as_of: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>>;

    /// Distinct fund IDs referenced by any transaction, across all
    /// portfolios. Drives which funds the sync scheduler tracks.
    fn tracked_fund_ids(&self) -> Result<Vec<String>>;

    /// Removes every transaction of a portfolio. Returns the number of
    /// deleted records. Used only by account/portfolio cascade deletes.
    async fn delete_by_portfolio(&self, portfolio_id: &str) -> Result<usize>;
}

/// Trait defining the contract for ledger service operations.
#[async_trait]
pub trait LedgerServiceTrait: Send + Sync {
    /// Validates and appends a new transaction, enforcing the running
    /// share balance.
    async fn record_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;

    /// Appends an offsetting entry for an accepted transaction.
    async fn reverse_transaction(&self, transaction_id: &str) -> Result<Transaction>;

    /// A portfolio's ledger history, optionally per fund and as of a date.
    fn history(
        &self,
        portfolio_id: &str,
        fund_id: Option<&str>,
        as_of: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>>;
}
