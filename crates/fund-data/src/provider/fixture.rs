//! Deterministic in-memory provider for tests and offline development.
//!
//! The fixture serves pre-loaded NAV series and can be scripted with failures
//! that are consumed one per call, which makes retry and partial-sync paths
//! reproducible without a network.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::errors::FundDataError;
use crate::models::{FundProfile, NavQuote};
use crate::provider::FundDataProvider;

const PROVIDER_ID: &str = "FIXTURE";

#[derive(Default)]
pub struct FixtureProvider {
    profiles: Mutex<HashMap<String, FundProfile>>,
    nav_series: Mutex<HashMap<String, Vec<NavQuote>>>,
    /// Scripted failures per fund, consumed oldest-first before serving data.
    failures: Mutex<HashMap<String, VecDeque<FundDataError>>>,
    history_calls: AtomicUsize,
    response_delay: Mutex<Option<Duration>>,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(self, profile: FundProfile) -> Self {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.fund_id.clone(), profile);
        self
    }

    /// Loads a NAV series for a fund. Quotes are kept sorted by date.
    pub fn with_nav_series(self, fund_id: &str, mut quotes: Vec<NavQuote>) -> Self {
        quotes.sort_by_key(|q| q.date);
        self.nav_series
            .lock()
            .unwrap()
            .insert(fund_id.to_string(), quotes);
        self
    }

    /// Queues a failure that the next `nav_history` call for `fund_id` returns.
    pub fn push_failure(&self, fund_id: &str, error: FundDataError) {
        self.failures
            .lock()
            .unwrap()
            .entry(fund_id.to_string())
            .or_default()
            .push_back(error);
    }

    /// Delays every `nav_history` response, for exercising fetch deadlines.
    pub fn set_response_delay(&self, delay: Option<Duration>) {
        *self.response_delay.lock().unwrap() = delay;
    }

    /// Number of `nav_history` calls served so far (including failures).
    pub fn history_call_count(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FundDataProvider for FixtureProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fund_profile(&self, fund_id: &str) -> Result<FundProfile, FundDataError> {
        self.profiles
            .lock()
            .unwrap()
            .get(fund_id)
            .cloned()
            .ok_or_else(|| FundDataError::FundNotFound(fund_id.to_string()))
    }

    async fn nav_history(
        &self,
        fund_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NavQuote>, FundDataError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.response_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(queue) = self.failures.lock().unwrap().get_mut(fund_id) {
            if let Some(error) = queue.pop_front() {
                return Err(error);
            }
        }

        let series = self.nav_series.lock().unwrap();
        let quotes: Vec<NavQuote> = match series.get(fund_id) {
            Some(quotes) => quotes
                .iter()
                .filter(|q| q.date >= start && q.date <= end)
                .cloned()
                .collect(),
            None => return Err(FundDataError::FundNotFound(fund_id.to_string())),
        };

        if quotes.is_empty() {
            return Err(FundDataError::NoData);
        }
        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quote(fund_id: &str, date: NaiveDate, nav: rust_decimal::Decimal) -> NavQuote {
        NavQuote {
            fund_id: fund_id.to_string(),
            date,
            nav,
            accumulated_nav: None,
            daily_return: None,
        }
    }

    #[tokio::test]
    async fn serves_range_filtered_series_after_scripted_failure() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let provider = FixtureProvider::new().with_nav_series(
            "110011",
            vec![
                quote("110011", d(2), dec!(1.00)),
                quote("110011", d(3), dec!(1.01)),
                quote("110011", d(10), dec!(1.05)),
            ],
        );
        provider.push_failure(
            "110011",
            FundDataError::Timeout {
                provider: "FIXTURE".to_string(),
            },
        );

        let first = provider.nav_history("110011", d(1), d(5)).await;
        assert!(matches!(first, Err(FundDataError::Timeout { .. })));

        let second = provider.nav_history("110011", d(1), d(5)).await.unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(provider.history_call_count(), 2);
    }
}
