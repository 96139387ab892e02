//! Portfolio repository and service traits.

use async_trait::async_trait;

use super::portfolios_model::{NewPortfolio, Portfolio, PortfolioUpdate};
use crate::errors::Result;

/// Trait defining the contract for Portfolio repository operations.
#[async_trait]
pub trait PortfolioRepositoryTrait: Send + Sync {
    /// Creates a new portfolio.
    async fn create(&self, new_portfolio: NewPortfolio) -> Result<Portfolio>;

    /// Renames an existing portfolio.
    async fn update(&self, portfolio_update: PortfolioUpdate) -> Result<Portfolio>;

    /// Deletes a portfolio by its ID. Returns the number of deleted records.
    ///
    /// Cascading to the portfolio's transactions is orchestrated by the
    /// service layer.
    async fn delete(&self, portfolio_id: &str) -> Result<usize>;

    /// Retrieves a portfolio by its ID.
    fn get_by_id(&self, portfolio_id: &str) -> Result<Portfolio>;

    /// Lists the portfolios belonging to an account.
    fn list_by_account(&self, account_id: &str) -> Result<Vec<Portfolio>>;

    /// Lists all portfolios.
    fn list(&self) -> Result<Vec<Portfolio>>;
}

/// Trait defining the contract for Portfolio service operations.
#[async_trait]
pub trait PortfolioServiceTrait: Send + Sync {
    /// Creates a new (non-default) portfolio under an account.
    async fn create_portfolio(&self, new_portfolio: NewPortfolio) -> Result<Portfolio>;

    /// Renames a portfolio.
    async fn update_portfolio(&self, portfolio_update: PortfolioUpdate) -> Result<Portfolio>;

    /// Deletes a portfolio and its transactions. The default portfolio can
    /// only be removed by deleting the owning account.
    async fn delete_portfolio(&self, portfolio_id: &str) -> Result<()>;

    /// Retrieves a portfolio by ID.
    fn get_portfolio(&self, portfolio_id: &str) -> Result<Portfolio>;

    /// Lists the portfolios belonging to an account.
    fn get_portfolios_for_account(&self, account_id: &str) -> Result<Vec<Portfolio>>;
}
