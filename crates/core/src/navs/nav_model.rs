//! Stored NAV history models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fundtrack_fund_data::NavQuote;

/// One published NAV value for one fund on one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavPoint {
    /// `{fund_id}_{date}`, the natural upsert key.
    pub id: String,
    pub fund_id: String,
    pub date: NaiveDate,
    /// Unit NAV, the per-share price valuations use.
    pub nav: Decimal,
    /// Cumulative NAV including past distributions, when published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accumulated_nav: Option<Decimal>,
    /// Day-over-day growth as a fraction, when published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_return: Option<Decimal>,
    pub data_source: String,
    pub fetched_at: DateTime<Utc>,
}

impl NavPoint {
    pub fn storage_id(fund_id: &str, date: NaiveDate) -> String {
        format!("{}_{}", fund_id, date.format("%Y-%m-%d"))
    }

    /// Builds a storable point from a provider quote.
    pub fn from_quote(quote: NavQuote, data_source: &str) -> Self {
        Self {
            id: Self::storage_id(&quote.fund_id, quote.date),
            fund_id: quote.fund_id,
            date: quote.date,
            nav: quote.nav,
            accumulated_nav: quote.accumulated_nav,
            daily_return: quote.daily_return,
            data_source: data_source.to_string(),
            fetched_at: Utc::now(),
        }
    }
}

/// The latest stored point and its predecessor, used for day-change
/// figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavPointPair {
    pub latest: NavPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<NavPoint>,
}
