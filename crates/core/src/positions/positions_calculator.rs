//! Deterministic replay of a transaction ledger into positions.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

use super::positions_model::{PortfolioSnapshot, Position};
use crate::constants::QUANTITY_THRESHOLD;
use crate::errors::{LedgerError, Result};
use crate::ledger::{Transaction, TransactionKind};
use crate::Error;

/// Rebuilds portfolio state by replaying ledger entries in order.
///
/// Replay is pure: the same entries always produce the same snapshot.
/// Entries must arrive ordered by trade date, then insertion sequence,
/// which is the ordering the repository guarantees.
pub struct PositionsCalculator;

impl PositionsCalculator {
    pub fn calculate(
        portfolio_id: &str,
        transactions: &[Transaction],
        as_of: NaiveDate,
    ) -> Result<PortfolioSnapshot> {
        let threshold = Decimal::from_str(QUANTITY_THRESHOLD)?;
        let mut positions: HashMap<String, Position> = HashMap::new();
        let mut cash_balance = Decimal::ZERO;
        let mut net_contribution = Decimal::ZERO;

        for tx in transactions {
            if tx.trade_date > as_of {
                continue;
            }

            net_contribution += Decimal::from(tx.kind.contribution_sign()) * tx.amount;

            match tx.kind {
                TransactionKind::Buy | TransactionKind::DividendReinvest => {
                    let position = positions.entry(tx.fund_id.clone()).or_insert_with(|| {
                        Position::new(portfolio_id, &tx.fund_id, tx.trade_date)
                    });
                    if tx.shares >= Decimal::ZERO {
                        position.add_lot(
                            format!("LOT-{}", tx.id),
                            tx.trade_date,
                            tx.shares,
                            tx.amount,
                            tx.nav,
                        );
                    } else {
                        // A reversed acquisition removes basis without
                        // realizing a gain.
                        let needed = -tx.shares;
                        Self::check_available(position, needed, threshold, tx)?;
                        position.reduce_lots_fifo(needed);
                    }
                }
                TransactionKind::Sell => {
                    if tx.shares <= Decimal::ZERO {
                        let needed = -tx.shares;
                        let position = positions.get_mut(&tx.fund_id).ok_or_else(|| {
                            corruption(tx, "sell of a fund with no position")
                        })?;
                        Self::check_available(position, needed, threshold, tx)?;
                        let (consumed, consumed_cost) = position.reduce_lots_fifo(needed);
                        position.realized_gain += consumed * tx.nav - consumed_cost;
                    } else {
                        // A reversed sell restores the shares as a fresh
                        // lot priced at the sale NAV; the original gain
                        // stays realized and the lot basis reflects it.
                        let position = positions.entry(tx.fund_id.clone()).or_insert_with(|| {
                            Position::new(portfolio_id, &tx.fund_id, tx.trade_date)
                        });
                        position.add_lot(
                            format!("LOT-{}", tx.id),
                            tx.trade_date,
                            tx.shares,
                            tx.shares * tx.nav,
                            tx.nav,
                        );
                    }
                }
                TransactionKind::DividendCash => {
                    cash_balance += tx.amount;
                }
                TransactionKind::Fee => {
                    cash_balance -= tx.amount;
                }
            }
        }

        // Drop dust left behind by threshold-tolerant sells.
        for position in positions.values_mut() {
            if !position.is_open() && !position.lots.is_empty() {
                position.lots.clear();
                position.recalculate_aggregates();
            }
        }

        Ok(PortfolioSnapshot {
            portfolio_id: portfolio_id.to_string(),
            as_of,
            positions,
            cash_balance,
            net_contribution,
        })
    }

    /// Write-time checks should make a shortfall impossible; hitting one
    /// during replay means the stored ledger is inconsistent.
    fn check_available(
        position: &Position,
        needed: Decimal,
        threshold: Decimal,
        tx: &Transaction,
    ) -> Result<()> {
        if needed > position.quantity + threshold {
            return Err(corruption(
                tx,
                &format!(
                    "needs {} shares but only {} are held",
                    needed, position.quantity
                ),
            ));
        }
        Ok(())
    }
}

fn corruption(tx: &Transaction, detail: &str) -> Error {
    Error::Ledger(LedgerError::Corruption(format!(
        "transaction {} ({} of {} in portfolio {}): {}",
        tx.id, tx.kind, tx.fund_id, tx.portfolio_id, detail
    )))
}
