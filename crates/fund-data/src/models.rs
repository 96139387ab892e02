//! Domain models returned by fund data providers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single published NAV observation for a fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavQuote {
    /// Fund code as listed by the provider (e.g. "110011").
    pub fund_id: String,
    /// Publication date of the NAV.
    pub date: NaiveDate,
    /// Unit NAV on that date.
    pub nav: Decimal,
    /// Accumulated NAV (unit NAV plus historical distributions), when published.
    pub accumulated_nav: Option<Decimal>,
    /// Daily growth rate as a fraction (0.0123 = 1.23%), when published.
    pub daily_return: Option<Decimal>,
}

/// Static descriptive data for a fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundProfile {
    pub fund_id: String,
    pub name: String,
    /// Inception date, used to bound how far back NAV history can exist.
    pub inception_date: Option<NaiveDate>,
    pub fund_type: Option<String>,
    pub company: Option<String>,
}
