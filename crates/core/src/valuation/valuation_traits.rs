//! Valuation service contract.

use chrono::NaiveDate;

use super::valuation_model::{AccountValuation, PortfolioValuation};
use crate::errors::Result;

/// Trait defining the contract for valuation operations.
///
/// Valuation only reads stored state, so both operations are
/// synchronous. `as_of` defaults to today.
pub trait ValuationServiceTrait: Send + Sync {
    /// Marks one portfolio to its stored NAVs.
    fn valuate_portfolio(
        &self,
        portfolio_id: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<PortfolioValuation>;

    /// Valuates every portfolio of an account and aggregates the totals.
    fn valuate_account(
        &self,
        account_id: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<AccountValuation>;
}
