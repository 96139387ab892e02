use log::debug;
use std::sync::Arc;

use super::accounts_model::{Account, AccountUpdate, NewAccount};
use super::accounts_traits::{AccountRepositoryTrait, AccountServiceTrait};
use crate::constants::DEFAULT_PORTFOLIO_NAME;
use crate::errors::Result;
use crate::ledger::TransactionRepositoryTrait;
use crate::portfolios::{NewPortfolio, PortfolioRepositoryTrait};

/// Service for managing accounts.
///
/// Owns the account lifecycle invariants: every account gets a default
/// portfolio on creation, and deletion cascades through portfolios down to
/// their transactions.
pub struct AccountService {
    account_repository: Arc<dyn AccountRepositoryTrait>,
    portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
}

impl AccountService {
    pub fn new(
        account_repository: Arc<dyn AccountRepositoryTrait>,
        portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    ) -> Self {
        Self {
            account_repository,
            portfolio_repository,
            transaction_repository,
        }
    }
}

#[async_trait::async_trait]
impl AccountServiceTrait for AccountService {
    async fn create_account(&self, new_account: NewAccount) -> Result<Account> {
        new_account.validate()?;
        let account = self.account_repository.create(new_account).await?;
        debug!("Created account {}", account.id);

        self.portfolio_repository
            .create(NewPortfolio {
                id: None,
                account_id: account.id.clone(),
                name: DEFAULT_PORTFOLIO_NAME.to_string(),
                is_default: true,
            })
            .await?;

        Ok(account)
    }

    async fn update_account(&self, account_update: AccountUpdate) -> Result<Account> {
        account_update.validate()?;
        self.account_repository.update(account_update).await
    }

    async fn delete_account(&self, account_id: &str) -> Result<()> {
        for portfolio in self.portfolio_repository.list_by_account(account_id)? {
            self.transaction_repository
                .delete_by_portfolio(&portfolio.id)
                .await?;
            self.portfolio_repository.delete(&portfolio.id).await?;
        }
        self.account_repository.delete(account_id).await?;
        debug!("Deleted account {} with its portfolios", account_id);
        Ok(())
    }

    fn get_account(&self, account_id: &str) -> Result<Account> {
        self.account_repository.get_by_id(account_id)
    }

    fn get_all_accounts(&self) -> Result<Vec<Account>> {
        self.account_repository.list()
    }
}
