use log::debug;
use std::sync::Arc;

use super::portfolios_model::{NewPortfolio, Portfolio, PortfolioUpdate};
use super::portfolios_traits::{PortfolioRepositoryTrait, PortfolioServiceTrait};
use crate::errors::{Result, ValidationError};
use crate::ledger::TransactionRepositoryTrait;
use crate::Error;

/// Service for managing portfolios.
pub struct PortfolioService {
    portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
}

impl PortfolioService {
    pub fn new(
        portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    ) -> Self {
        Self {
            portfolio_repository,
            transaction_repository,
        }
    }
}

#[async_trait::async_trait]
impl PortfolioServiceTrait for PortfolioService {
    async fn create_portfolio(&self, new_portfolio: NewPortfolio) -> Result<Portfolio> {
        new_portfolio.validate()?;
        if new_portfolio.is_default {
            // The default portfolio is created by the account service only.
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Cannot create an additional default portfolio".to_string(),
            )));
        }
        self.portfolio_repository.create(new_portfolio).await
    }

    async fn update_portfolio(&self, portfolio_update: PortfolioUpdate) -> Result<Portfolio> {
        portfolio_update.validate()?;
        self.portfolio_repository.update(portfolio_update).await
    }

    async fn delete_portfolio(&self, portfolio_id: &str) -> Result<()> {
        let portfolio = self.portfolio_repository.get_by_id(portfolio_id)?;
        if portfolio.is_default {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "The default portfolio can only be deleted with its account".to_string(),
            )));
        }

        let removed = self
            .transaction_repository
            .delete_by_portfolio(portfolio_id)
            .await?;
        self.portfolio_repository.delete(portfolio_id).await?;
        debug!(
            "Deleted portfolio {} and {} transactions",
            portfolio_id, removed
        );
        Ok(())
    }

    fn get_portfolio(&self, portfolio_id: &str) -> Result<Portfolio> {
        self.portfolio_repository.get_by_id(portfolio_id)
    }

    fn get_portfolios_for_account(&self, account_id: &str) -> Result<Vec<Portfolio>> {
        self.portfolio_repository.list_by_account(account_id)
    }
}
