//! In-memory sync job store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use fundtrack_core::errors::Result;
use fundtrack_core::sync::{SyncJob, SyncJobStore};

use crate::accounts::poisoned;

#[derive(Default)]
pub struct SyncJobMemoryStore {
    jobs: RwLock<HashMap<String, SyncJob>>,
}

impl SyncJobMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SyncJobStore for SyncJobMemoryStore {
    async fn upsert(&self, job: SyncJob) -> Result<SyncJob> {
        self.jobs
            .write()
            .map_err(poisoned)?
            .insert(job.fund_id.clone(), job.clone());
        Ok(job)
    }

    fn get(&self, fund_id: &str) -> Result<Option<SyncJob>> {
        Ok(self.jobs.read().map_err(poisoned)?.get(fund_id).cloned())
    }

    fn list(&self) -> Result<Vec<SyncJob>> {
        let mut jobs: Vec<SyncJob> = self.jobs.read().map_err(poisoned)?.values().cloned().collect();
        jobs.sort_by(|a, b| a.fund_id.cmp(&b.fund_id));
        Ok(jobs)
    }
}
