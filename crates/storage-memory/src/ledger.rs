//! In-memory append-only transaction ledger.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use fundtrack_core::errors::{Result, StorageError};
use fundtrack_core::ledger::{NewTransaction, Transaction, TransactionRepositoryTrait};
use fundtrack_core::Error;

use crate::accounts::poisoned;

#[derive(Default)]
pub struct TransactionMemoryRepository {
    transactions: RwLock<Vec<Transaction>>,
    sequence: AtomicI64,
}

impl TransactionMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionRepositoryTrait for TransactionMemoryRepository {
    async fn append(
        &self,
        new_transaction: NewTransaction,
        reverses: Option<String>,
    ) -> Result<Transaction> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let id = new_transaction
            .id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let mut transactions = self.transactions.write().map_err(poisoned)?;
        if transactions.iter().any(|tx| tx.id == id) {
            return Err(Error::Storage(StorageError::UniqueViolation(format!(
                "transaction {id} already exists"
            ))));
        }
        let transaction = Transaction {
            id,
            portfolio_id: new_transaction.portfolio_id,
            fund_id: new_transaction.fund_id,
            kind: new_transaction.kind,
            trade_date: new_transaction.trade_date,
            shares: new_transaction.shares,
            nav: new_transaction.nav,
            amount: new_transaction.amount,
            settlement_date: new_transaction.settlement_date,
            reverses,
            sequence,
            created_at: Utc::now(),
        };
        transactions.push(transaction.clone());
        Ok(transaction)
    }

    fn get_by_id(&self, transaction_id: &str) -> Result<Transaction> {
        self.transactions
            .read()
            .map_err(poisoned)?
            .iter()
            .find(|tx| tx.id == transaction_id)
            .cloned()
            .ok_or_else(|| Error::Storage(StorageError::NotFound(transaction_id.to_string())))
    }

    fn list(
        &self,
        portfolio_id: &str,
        fund_id: Option<&str>,
        as_of: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        let mut transactions: Vec<Transaction> = self
            .transactions
            .read()
            .map_err(poisoned)?
            .iter()
            .filter(|tx| tx.portfolio_id == portfolio_id)
            .filter(|tx| fund_id.map_or(true, |f| tx.fund_id == f))
            .filter(|tx| as_of.map_or(true, |d| tx.trade_date <= d))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| (a.trade_date, a.sequence).cmp(&(b.trade_date, b.sequence)));
        Ok(transactions)
    }

    fn tracked_fund_ids(&self) -> Result<Vec<String>> {
        let mut fund_ids: Vec<String> = self
            .transactions
            .read()
            .map_err(poisoned)?
            .iter()
            .map(|tx| tx.fund_id.clone())
            .collect();
        fund_ids.sort();
        fund_ids.dedup();
        Ok(fund_ids)
    }

    async fn delete_by_portfolio(&self, portfolio_id: &str) -> Result<usize> {
        let mut transactions = self.transactions.write().map_err(poisoned)?;
        let before = transactions.len();
        transactions.retain(|tx| tx.portfolio_id != portfolio_id);
        Ok(before - transactions.len())
    }
}
