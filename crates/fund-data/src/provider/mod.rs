//! Fund data provider trait and implementations.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::FundDataError;
use crate::models::{FundProfile, NavQuote};

pub mod eastmoney;
pub mod fixture;

pub use eastmoney::EastmoneyProvider;
pub use fixture::FixtureProvider;

/// A source of authoritative fund NAV data.
///
/// Implementations are expected to be safe to call concurrently for distinct
/// funds. Callers own timeout and retry policy; implementations should surface
/// raw failures through `FundDataError` without retrying internally.
#[async_trait]
pub trait FundDataProvider: Send + Sync {
    /// Stable identifier for this provider (e.g. "EASTMONEY").
    fn id(&self) -> &'static str;

    /// Fetches descriptive data for a fund.
    ///
    /// Returns `FundDataError::FundNotFound` for unknown fund codes.
    async fn fund_profile(&self, fund_id: &str) -> Result<FundProfile, FundDataError>;

    /// Fetches NAV history for `fund_id` over `[start, end]` inclusive.
    ///
    /// The result is ordered by date ascending. Days without a published NAV
    /// (weekends, holidays) are simply absent. An empty range that the fund
    /// predates yields `FundDataError::NoData`.
    async fn nav_history(
        &self,
        fund_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NavQuote>, FundDataError>;
}
