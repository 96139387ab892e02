//! Position models derived from ledger replay.
//!
//! Positions are never stored. They are rebuilt from the transaction
//! ledger on demand, so a position is always consistent with the entries
//! that produced it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::str::FromStr;

use crate::constants::QUANTITY_THRESHOLD;

/// An acquisition lot inside a position. Lots are consumed first-in
/// first-out when shares are sold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: String,
    pub position_id: String,
    pub acquisition_date: NaiveDate,
    pub quantity: Decimal,
    /// Money paid for the remaining quantity of this lot.
    pub cost_basis: Decimal,
    pub acquisition_nav: Decimal,
}

/// A fund holding inside one portfolio, with its open lots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub portfolio_id: String,
    pub fund_id: String,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub total_cost_basis: Decimal,
    /// Gains realized by sells, accumulated over the replayed history.
    pub realized_gain: Decimal,
    /// Trade date of the oldest entry that touched this position.
    pub inception_date: NaiveDate,
    pub lots: VecDeque<Lot>,
}

impl Position {
    pub fn new(portfolio_id: &str, fund_id: &str, inception_date: NaiveDate) -> Self {
        Self {
            id: format!("POS-{}-{}", fund_id, portfolio_id),
            portfolio_id: portfolio_id.to_string(),
            fund_id: fund_id.to_string(),
            quantity: Decimal::ZERO,
            average_cost: Decimal::ZERO,
            total_cost_basis: Decimal::ZERO,
            realized_gain: Decimal::ZERO,
            inception_date,
            lots: VecDeque::new(),
        }
    }

    /// Appends an acquisition lot. Replay feeds entries in trade-date
    /// order, so push_back keeps the deque FIFO-ordered.
    pub fn add_lot(
        &mut self,
        lot_id: String,
        acquisition_date: NaiveDate,
        quantity: Decimal,
        cost_basis: Decimal,
        acquisition_nav: Decimal,
    ) {
        self.lots.push_back(Lot {
            id: lot_id,
            position_id: self.id.clone(),
            acquisition_date,
            quantity,
            cost_basis,
            acquisition_nav,
        });
        self.recalculate_aggregates();
    }

    /// Consumes up to `quantity` shares from the oldest lots. Returns the
    /// quantity actually consumed and its cost basis. Lots reduced to a
    /// quantity below the significance threshold are dropped.
    pub fn reduce_lots_fifo(&mut self, quantity: Decimal) -> (Decimal, Decimal) {
        let mut remaining = quantity;
        let mut consumed_quantity = Decimal::ZERO;
        let mut consumed_cost = Decimal::ZERO;

        while remaining > Decimal::ZERO {
            let Some(lot) = self.lots.front_mut() else {
                break;
            };
            if lot.quantity <= remaining {
                remaining -= lot.quantity;
                consumed_quantity += lot.quantity;
                consumed_cost += lot.cost_basis;
                self.lots.pop_front();
            } else {
                let fraction = remaining / lot.quantity;
                let cost_part = lot.cost_basis * fraction;
                lot.quantity -= remaining;
                lot.cost_basis -= cost_part;
                consumed_quantity += remaining;
                consumed_cost += cost_part;
                remaining = Decimal::ZERO;
                if !is_quantity_significant(&lot.quantity) {
                    consumed_quantity += lot.quantity;
                    consumed_cost += lot.cost_basis;
                    self.lots.pop_front();
                }
            }
        }

        self.recalculate_aggregates();
        (consumed_quantity, consumed_cost)
    }

    /// Recomputes quantity, cost basis and average cost from the lots.
    pub fn recalculate_aggregates(&mut self) {
        self.quantity = self.lots.iter().map(|lot| lot.quantity).sum();
        self.total_cost_basis = self.lots.iter().map(|lot| lot.cost_basis).sum();
        self.average_cost = if is_quantity_significant(&self.quantity) {
            self.total_cost_basis / self.quantity
        } else {
            Decimal::ZERO
        };
    }

    pub fn is_open(&self) -> bool {
        is_quantity_significant(&self.quantity)
    }
}

/// Whether a share quantity is large enough to matter.
pub fn is_quantity_significant(quantity: &Decimal) -> bool {
    let threshold = Decimal::from_str(QUANTITY_THRESHOLD).unwrap_or(Decimal::ZERO);
    quantity.abs() > threshold
}

/// The full derived state of one portfolio as of a date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub portfolio_id: String,
    pub as_of: NaiveDate,
    /// Open and closed positions keyed by fund ID.
    pub positions: HashMap<String, Position>,
    /// Accumulated cash dividends minus fees.
    pub cash_balance: Decimal,
    /// Net external money put into the portfolio.
    pub net_contribution: Decimal,
}

impl PortfolioSnapshot {
    pub fn total_realized_gain(&self) -> Decimal {
        self.positions.values().map(|p| p.realized_gain).sum()
    }

    /// Positions still holding a significant share quantity.
    pub fn open_positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values().filter(|p| p.is_open())
    }
}
