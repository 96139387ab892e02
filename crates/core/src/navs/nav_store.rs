//! NAV storage contract.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::nav_model::{NavPoint, NavPointPair};
use crate::errors::Result;

/// Trait defining the contract for NAV history storage.
///
/// Writes are last-write-wins upserts keyed by `(fund_id, date)`, so a
/// re-fetch of an already stored date replaces the value. Reads used in
/// valuation are synchronous.
#[async_trait]
pub trait NavStore: Send + Sync {
    /// Inserts or replaces the given points. Returns how many were
    /// written.
    async fn upsert_points(&self, points: &[NavPoint]) -> Result<usize>;

    /// The newest stored point with `date <= as_of`, if any. Valuation
    /// falls back to earlier dates when the fund has not published a
    /// value for `as_of` itself.
    fn latest_on_or_before(&self, fund_id: &str, as_of: NaiveDate) -> Result<Option<NavPoint>>;

    /// The newest point on or before `as_of` together with the point
    /// preceding it.
    fn latest_with_previous(&self, fund_id: &str, as_of: NaiveDate) -> Result<Option<NavPointPair>>;

    /// Earliest and latest stored dates for a fund, if it has any points.
    /// Drives incremental sync planning.
    fn bounds(&self, fund_id: &str) -> Result<Option<(NaiveDate, NaiveDate)>>;
}
