//! Ledger service: validated, balance-checked appends to the transaction
//! ledger, plus reversals.

use chrono::Utc;
use dashmap::DashMap;
use log::debug;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::ledger_model::{NewTransaction, Transaction};
use super::ledger_traits::{LedgerServiceTrait, TransactionRepositoryTrait};
use crate::constants::QUANTITY_THRESHOLD;
use crate::errors::{LedgerError, Result};
use crate::Error;

/// Service enforcing ledger invariants on top of the repository.
///
/// Appends to the same portfolio are serialized with a per-portfolio
/// mutex so the balance check and the append act on a consistent view.
pub struct LedgerService {
    repository: Arc<dyn TransactionRepositoryTrait>,
    write_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl LedgerService {
    pub fn new(repository: Arc<dyn TransactionRepositoryTrait>) -> Self {
        Self {
            repository,
            write_locks: DashMap::new(),
        }
    }

    fn portfolio_lock(&self, portfolio_id: &str) -> Arc<Mutex<()>> {
        self.write_locks
            .entry(portfolio_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Rejects the candidate if inserting it would take the fund's running
    /// share balance negative at any point in trade-date order. The
    /// candidate sorts after existing entries sharing its trade date.
    fn check_running_balance(&self, candidate: &NewTransaction) -> Result<()> {
        if candidate.shares >= Decimal::ZERO {
            return Ok(());
        }

        let threshold = Decimal::from_str(QUANTITY_THRESHOLD)?;
        let existing =
            self.repository
                .list(&candidate.portfolio_id, Some(&candidate.fund_id), None)?;

        let mut balance = Decimal::ZERO;
        let mut candidate_applied = false;
        for tx in &existing {
            if !candidate_applied && tx.trade_date > candidate.trade_date {
                balance += candidate.shares;
                candidate_applied = true;
                if balance < -threshold {
                    return Err(insufficient(candidate));
                }
            }
            balance += tx.shares;
            if candidate_applied && balance < -threshold {
                return Err(insufficient(candidate));
            }
        }
        if !candidate_applied {
            balance += candidate.shares;
            if balance < -threshold {
                return Err(insufficient(candidate));
            }
        }
        Ok(())
    }

    async fn append_checked(
        &self,
        new_transaction: NewTransaction,
        reverses: Option<String>,
    ) -> Result<Transaction> {
        let lock = self.portfolio_lock(&new_transaction.portfolio_id);
        let _guard = lock.lock().await;
        self.check_running_balance(&new_transaction)?;
        self.repository.append(new_transaction, reverses).await
    }
}

#[async_trait::async_trait]
impl LedgerServiceTrait for LedgerService {
    async fn record_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        new_transaction.validate()?;
        if new_transaction.trade_date > Utc::now().date_naive() {
            return Err(Error::Ledger(LedgerError::InvalidTransaction(
                "Trade date cannot be in the future".to_string(),
            )));
        }
        let tx = self.append_checked(new_transaction, None).await?;
        debug!(
            "Recorded {} of {} shares of {} in portfolio {}",
            tx.kind, tx.shares, tx.fund_id, tx.portfolio_id
        );
        Ok(tx)
    }

    async fn reverse_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        let original = self.repository.get_by_id(transaction_id)?;

        let siblings = self.repository.list(&original.portfolio_id, None, None)?;
        if siblings
            .iter()
            .any(|tx| tx.reverses.as_deref() == Some(transaction_id))
        {
            return Err(Error::Ledger(LedgerError::AlreadyReversed(
                transaction_id.to_string(),
            )));
        }

        // The offsetting entry keeps the original kind and trade date and
        // negates shares and amount, so replay cancels the original in
        // place. Share-sign validation does not apply to it.
        let offsetting = NewTransaction {
            id: None,
            portfolio_id: original.portfolio_id.clone(),
            fund_id: original.fund_id.clone(),
            kind: original.kind,
            trade_date: original.trade_date,
            shares: -original.shares,
            nav: original.nav,
            amount: -original.amount,
            settlement_date: original.settlement_date,
        };

        let tx = self
            .append_checked(offsetting, Some(transaction_id.to_string()))
            .await?;
        debug!("Reversed transaction {} with {}", transaction_id, tx.id);
        Ok(tx)
    }

    fn history(
        &self,
        portfolio_id: &str,
        fund_id: Option<&str>,
        as_of: Option<chrono::NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        self.repository.list(portfolio_id, fund_id, as_of)
    }
}

fn insufficient(candidate: &NewTransaction) -> Error {
    Error::Ledger(LedgerError::InsufficientShares {
        portfolio_id: candidate.portfolio_id.clone(),
        fund_id: candidate.fund_id.clone(),
        date: candidate.trade_date,
    })
}
