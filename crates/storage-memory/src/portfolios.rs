//! In-memory portfolio repository.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

use fundtrack_core::errors::{Result, StorageError};
use fundtrack_core::portfolios::{
    NewPortfolio, Portfolio, PortfolioRepositoryTrait, PortfolioUpdate,
};
use fundtrack_core::Error;

use crate::accounts::poisoned;

#[derive(Default)]
pub struct PortfolioMemoryRepository {
    portfolios: RwLock<HashMap<String, Portfolio>>,
}

impl PortfolioMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PortfolioRepositoryTrait for PortfolioMemoryRepository {
    async fn create(&self, new_portfolio: NewPortfolio) -> Result<Portfolio> {
        let id = new_portfolio
            .id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let mut portfolios = self.portfolios.write().map_err(poisoned)?;
        if portfolios.contains_key(&id) {
            return Err(Error::Storage(StorageError::UniqueViolation(format!(
                "portfolio {id} already exists"
            ))));
        }
        let portfolio = Portfolio {
            id: id.clone(),
            account_id: new_portfolio.account_id,
            name: new_portfolio.name,
            is_default: new_portfolio.is_default,
            created_at: Utc::now(),
        };
        portfolios.insert(id, portfolio.clone());
        Ok(portfolio)
    }

    async fn update(&self, portfolio_update: PortfolioUpdate) -> Result<Portfolio> {
        let mut portfolios = self.portfolios.write().map_err(poisoned)?;
        let portfolio = portfolios
            .get_mut(&portfolio_update.id)
            .ok_or_else(|| Error::Storage(StorageError::NotFound(portfolio_update.id.clone())))?;
        portfolio.name = portfolio_update.name;
        Ok(portfolio.clone())
    }

    async fn delete(&self, portfolio_id: &str) -> Result<usize> {
        let mut portfolios = self.portfolios.write().map_err(poisoned)?;
        Ok(portfolios.remove(portfolio_id).map_or(0, |_| 1))
    }

    fn get_by_id(&self, portfolio_id: &str) -> Result<Portfolio> {
        self.portfolios
            .read()
            .map_err(poisoned)?
            .get(portfolio_id)
            .cloned()
            .ok_or_else(|| Error::Storage(StorageError::NotFound(portfolio_id.to_string())))
    }

    fn list_by_account(&self, account_id: &str) -> Result<Vec<Portfolio>> {
        let mut portfolios: Vec<Portfolio> = self
            .portfolios
            .read()
            .map_err(poisoned)?
            .values()
            .filter(|p| p.account_id == account_id)
            .cloned()
            .collect();
        portfolios.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(portfolios)
    }

    fn list(&self) -> Result<Vec<Portfolio>> {
        let mut portfolios: Vec<Portfolio> = self
            .portfolios
            .read()
            .map_err(poisoned)?
            .values()
            .cloned()
            .collect();
        portfolios.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(portfolios)
    }
}
