//! In-memory account repository.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

use fundtrack_core::accounts::{Account, AccountRepositoryTrait, AccountUpdate, NewAccount};
use fundtrack_core::errors::{Result, StorageError};
use fundtrack_core::Error;

#[derive(Default)]
pub struct AccountMemoryRepository {
    accounts: RwLock<HashMap<String, Account>>,
}

impl AccountMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepositoryTrait for AccountMemoryRepository {
    async fn create(&self, new_account: NewAccount) -> Result<Account> {
        let id = new_account
            .id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let mut accounts = self.accounts.write().map_err(poisoned)?;
        if accounts.contains_key(&id) {
            return Err(Error::Storage(StorageError::UniqueViolation(format!(
                "account {id} already exists"
            ))));
        }
        let account = Account {
            id: id.clone(),
            name: new_account.name,
            created_at: Utc::now(),
        };
        accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn update(&self, account_update: AccountUpdate) -> Result<Account> {
        let mut accounts = self.accounts.write().map_err(poisoned)?;
        let account = accounts
            .get_mut(&account_update.id)
            .ok_or_else(|| Error::Storage(StorageError::NotFound(account_update.id.clone())))?;
        account.name = account_update.name;
        Ok(account.clone())
    }

    async fn delete(&self, account_id: &str) -> Result<usize> {
        let mut accounts = self.accounts.write().map_err(poisoned)?;
        Ok(accounts.remove(account_id).map_or(0, |_| 1))
    }

    fn get_by_id(&self, account_id: &str) -> Result<Account> {
        self.accounts
            .read()
            .map_err(poisoned)?
            .get(account_id)
            .cloned()
            .ok_or_else(|| Error::Storage(StorageError::NotFound(account_id.to_string())))
    }

    fn list(&self) -> Result<Vec<Account>> {
        let mut accounts: Vec<Account> =
            self.accounts.read().map_err(poisoned)?.values().cloned().collect();
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(accounts)
    }
}

pub(crate) fn poisoned<T>(_: std::sync::PoisonError<T>) -> Error {
    Error::Storage(StorageError::Internal("storage lock poisoned".to_string()))
}
