//! In-memory NAV store.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use fundtrack_core::errors::Result;
use fundtrack_core::navs::{NavPoint, NavPointPair, NavStore};

/// NAV history keyed by fund, with per-fund series ordered by date so
/// "latest on or before" is a range lookup.
#[derive(Default)]
pub struct NavMemoryStore {
    points: RwLock<HashMap<String, BTreeMap<NaiveDate, NavPoint>>>,
}

impl NavMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NavStore for NavMemoryStore {
    async fn upsert_points(&self, points: &[NavPoint]) -> Result<usize> {
        let mut stored = self.points.write().map_err(crate::accounts::poisoned)?;
        for point in points {
            stored
                .entry(point.fund_id.clone())
                .or_default()
                .insert(point.date, point.clone());
        }
        Ok(points.len())
    }

    fn latest_on_or_before(&self, fund_id: &str, as_of: NaiveDate) -> Result<Option<NavPoint>> {
        let points = self.points.read().map_err(crate::accounts::poisoned)?;
        Ok(points
            .get(fund_id)
            .and_then(|series| series.range(..=as_of).next_back().map(|(_, p)| p.clone())))
    }

    fn latest_with_previous(
        &self,
        fund_id: &str,
        as_of: NaiveDate,
    ) -> Result<Option<NavPointPair>> {
        let points = self.points.read().map_err(crate::accounts::poisoned)?;
        let Some(series) = points.get(fund_id) else {
            return Ok(None);
        };
        let mut iter = series.range(..=as_of).rev();
        let Some((_, latest)) = iter.next() else {
            return Ok(None);
        };
        Ok(Some(NavPointPair {
            latest: latest.clone(),
            previous: iter.next().map(|(_, p)| p.clone()),
        }))
    }

    fn bounds(&self, fund_id: &str) -> Result<Option<(NaiveDate, NaiveDate)>> {
        let points = self.points.read().map_err(crate::accounts::poisoned)?;
        Ok(points.get(fund_id).and_then(|series| {
            let first = series.keys().next()?;
            let last = series.keys().next_back()?;
            Some((*first, *last))
        }))
    }
}
