//! Valuation output models.
//!
//! Valuations are computed on demand from replayed positions and stored
//! NAVs; nothing here is persisted.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Non-fatal problems encountered while valuating. The valuation is
/// still returned; affected funds are excluded from the totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValuationWarning {
    /// No stored NAV exists on or before the valuation date.
    #[serde(rename_all = "camelCase")]
    MissingNav { fund_id: String },
}

/// One fund's marked-to-NAV state inside a portfolio valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundValuation {
    pub fund_id: String,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub cost_basis: Decimal,
    /// NAV used for the mark, which may predate the valuation date when
    /// the fund has not published a newer value.
    pub nav: Decimal,
    pub nav_date: NaiveDate,
    pub market_value: Decimal,
    pub unrealized_gain: Decimal,
    pub realized_gain: Decimal,
    /// Value change between the two newest stored NAVs. Absent when only
    /// one point exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_change: Option<Decimal>,
}

/// A portfolio's complete valuation as of a date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuation {
    pub portfolio_id: String,
    pub as_of: NaiveDate,
    pub funds: Vec<FundValuation>,
    pub warnings: Vec<ValuationWarning>,
    pub cash_balance: Decimal,
    /// Sum of fund market values, excluding warned funds.
    pub investment_value: Decimal,
    /// Investment value plus cash.
    pub total_value: Decimal,
    pub cost_basis: Decimal,
    pub net_contribution: Decimal,
    pub realized_gain: Decimal,
    pub unrealized_gain: Decimal,
    /// Sum of available per-fund day changes.
    pub day_change: Decimal,
    /// Money-weighted return over contributed money. Absent when nothing
    /// was net-contributed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_rate: Option<Decimal>,
    pub calculated_at: DateTime<Utc>,
}

/// An account's valuation, aggregated over its portfolios.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountValuation {
    pub account_id: String,
    pub as_of: NaiveDate,
    pub portfolios: Vec<PortfolioValuation>,
    pub total_value: Decimal,
    pub net_contribution: Decimal,
    pub realized_gain: Decimal,
    pub unrealized_gain: Decimal,
    pub day_change: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_rate: Option<Decimal>,
    pub calculated_at: DateTime<Utc>,
}
