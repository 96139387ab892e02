//! Fetches NAV history from a provider and commits it to the store.

use chrono::NaiveDate;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, warn};
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use fundtrack_fund_data::{FundDataError, FundDataProvider, NavQuote};

use crate::constants::{
    BACKOFF_BASE_MS, BACKOFF_CAP_MS, BACKOFF_JITTER_MS, FETCH_DEADLINE_SECS, MAX_FETCH_ATTEMPTS,
    SYNC_PAGE_DAYS,
};
use crate::navs::{NavPoint, NavStore};

/// Tuning knobs for fetching and retrying.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub backoff_cap: Duration,
    pub jitter: Duration,
    pub fetch_deadline: Duration,
    /// Large date ranges are fetched in pages of this many days so an
    /// early page survives a late failure.
    pub page_days: i64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_FETCH_ATTEMPTS,
            backoff_base: Duration::from_millis(BACKOFF_BASE_MS),
            backoff_cap: Duration::from_millis(BACKOFF_CAP_MS),
            jitter: Duration::from_millis(BACKOFF_JITTER_MS),
            fetch_deadline: Duration::from_secs(FETCH_DEADLINE_SECS),
            page_days: SYNC_PAGE_DAYS,
        }
    }
}

/// How a fund sync ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FundSyncStatus {
    Success,
    /// Another sync of the same fund was already in flight.
    Skipped,
    Failed,
}

/// Result of syncing one fund. Points committed before a failure stay
/// committed and are counted here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundSyncOutcome {
    pub fund_id: String,
    pub status: FundSyncStatus,
    pub points_upserted: usize,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the failure is worth retrying at the next window.
    pub transient: bool,
}

impl FundSyncOutcome {
    fn skipped(fund_id: &str) -> Self {
        Self {
            fund_id: fund_id.to_string(),
            status: FundSyncStatus::Skipped,
            points_upserted: 0,
            attempts: 0,
            error: None,
            transient: false,
        }
    }
}

/// Fetches NAV pages with retry and commits them per page.
///
/// Concurrent syncs of the same fund coalesce: the first caller runs,
/// later callers get a `Skipped` outcome instead of a duplicate fetch.
pub struct NavSyncService {
    provider: Arc<dyn FundDataProvider>,
    nav_store: Arc<dyn NavStore>,
    config: SyncConfig,
    in_flight: DashMap<String, ()>,
}

/// Removes the fund's in-flight marker when the sync ends, on every
/// path out of `sync_fund`.
struct InFlightGuard<'a> {
    map: &'a DashMap<String, ()>,
    fund_id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.map.remove(&self.fund_id);
    }
}

impl NavSyncService {
    pub fn new(
        provider: Arc<dyn FundDataProvider>,
        nav_store: Arc<dyn NavStore>,
        config: SyncConfig,
    ) -> Self {
        Self {
            provider,
            nav_store,
            config,
            in_flight: DashMap::new(),
        }
    }

    fn try_acquire(&self, fund_id: &str) -> Option<InFlightGuard<'_>> {
        match self.in_flight.entry(fund_id.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(vacant) => {
                vacant.insert(());
                Some(InFlightGuard {
                    map: &self.in_flight,
                    fund_id: fund_id.to_string(),
                })
            }
        }
    }

    /// Syncs one fund's NAV history over `[start, end]`.
    pub async fn sync_fund(&self, fund_id: &str, start: NaiveDate, end: NaiveDate) -> FundSyncOutcome {
        let Some(_guard) = self.try_acquire(fund_id) else {
            debug!("Sync of fund {} already in flight, skipping", fund_id);
            return FundSyncOutcome::skipped(fund_id);
        };

        let mut outcome = FundSyncOutcome {
            fund_id: fund_id.to_string(),
            status: FundSyncStatus::Success,
            points_upserted: 0,
            attempts: 0,
            error: None,
            transient: false,
        };

        let mut page_start = start;
        while page_start <= end {
            let page_end = (page_start + chrono::Duration::days(self.config.page_days - 1)).min(end);
            match self.fetch_page(fund_id, page_start, page_end, &mut outcome.attempts).await {
                Ok(quotes) => {
                    if !quotes.is_empty() {
                        let points: Vec<NavPoint> = quotes
                            .into_iter()
                            .map(|q| NavPoint::from_quote(q, self.provider.id()))
                            .collect();
                        match self.nav_store.upsert_points(&points).await {
                            Ok(written) => outcome.points_upserted += written,
                            Err(err) => {
                                warn!("Failed to store NAVs for fund {}: {}", fund_id, err);
                                outcome.status = FundSyncStatus::Failed;
                                outcome.error = Some(err.to_string());
                                return outcome;
                            }
                        }
                    }
                }
                Err(err) => {
                    warn!(
                        "Fetch of fund {} failed for {}..{}: {}",
                        fund_id, page_start, page_end, err
                    );
                    outcome.status = FundSyncStatus::Failed;
                    outcome.transient = err.is_transient();
                    outcome.error = Some(err.to_string());
                    return outcome;
                }
            }
            page_start = page_end + chrono::Duration::days(1);
        }

        debug!(
            "Synced fund {}: {} points over {}..{}",
            fund_id, outcome.points_upserted, start, end
        );
        outcome
    }

    /// Fetches one page, retrying transient failures with capped
    /// exponential backoff. An empty range is a success, not an error.
    async fn fetch_page(
        &self,
        fund_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        attempts: &mut u32,
    ) -> Result<Vec<NavQuote>, FundDataError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            *attempts += 1;

            let fetch = self.provider.nav_history(fund_id, start, end);
            let result = match tokio::time::timeout(self.config.fetch_deadline, fetch).await {
                Ok(result) => result,
                Err(_) => Err(FundDataError::Timeout {
                    provider: self.provider.id().to_string(),
                }),
            };

            match result {
                Ok(quotes) => return Ok(quotes),
                Err(FundDataError::NoData) => return Ok(Vec::new()),
                Err(err) if err.is_transient() && attempt < self.config.max_attempts => {
                    let delay = self.backoff_delay(attempt);
                    debug!(
                        "Transient failure fetching fund {} (attempt {}), retrying in {:?}: {}",
                        fund_id, attempt, delay, err
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = self
            .config
            .backoff_base
            .saturating_mul(1u32 << (attempt - 1).min(16))
            .min(self.config.backoff_cap);
        let jitter_ms = self.config.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            exp
        } else {
            exp + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
        }
    }
}
