//! Orchestrates scheduled NAV syncs across all tracked funds.

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use fundtrack_fund_data::FundDataProvider;

use super::nav_sync::{FundSyncOutcome, FundSyncStatus, NavSyncService, SyncConfig};
use super::sync_state::{JobStatus, SyncJob, SyncJobStore, SyncSchedule};
use crate::constants::{DEFAULT_BACKFILL_DAYS, MAX_CONCURRENT_SYNCS, NAV_OVERLAP_DAYS};
use crate::errors::Result;
use crate::ledger::TransactionRepositoryTrait;
use crate::navs::NavStore;

#[derive(Debug, Clone)]
pub struct TaskManagerConfig {
    pub max_concurrent_syncs: usize,
    pub schedule: SyncSchedule,
    /// Days re-fetched before the newest stored point to pick up source
    /// corrections.
    pub overlap_days: i64,
    /// History depth for funds with no stored points and no known
    /// inception date.
    pub backfill_days: i64,
    pub sync: SyncConfig,
}

impl Default for TaskManagerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_syncs: MAX_CONCURRENT_SYNCS,
            schedule: SyncSchedule::default(),
            overlap_days: NAV_OVERLAP_DAYS,
            backfill_days: DEFAULT_BACKFILL_DAYS,
            sync: SyncConfig::default(),
        }
    }
}

/// Keeps one sync job per fund referenced by the ledger, decides when
/// each is due and runs due syncs with bounded concurrency.
pub struct TaskManager {
    provider: Arc<dyn FundDataProvider>,
    nav_store: Arc<dyn NavStore>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    job_store: Arc<dyn SyncJobStore>,
    sync_service: NavSyncService,
    config: TaskManagerConfig,
}

impl TaskManager {
    pub fn new(
        provider: Arc<dyn FundDataProvider>,
        nav_store: Arc<dyn NavStore>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        job_store: Arc<dyn SyncJobStore>,
        config: TaskManagerConfig,
    ) -> Self {
        let sync_service =
            NavSyncService::new(provider.clone(), nav_store.clone(), config.sync.clone());
        Self {
            provider,
            nav_store,
            transaction_repository,
            job_store,
            sync_service,
            config,
        }
    }

    /// Aligns the job table with the funds the ledger references:
    /// creates jobs for new funds, disables jobs whose fund no longer
    /// appears in any transaction.
    pub async fn refresh_tracked_funds(&self) -> Result<()> {
        let tracked = self.transaction_repository.tracked_fund_ids()?;

        for fund_id in &tracked {
            match self.job_store.get(fund_id)? {
                None => {
                    debug!("Tracking new fund {} for NAV sync", fund_id);
                    self.job_store
                        .upsert(SyncJob::new(fund_id, self.config.schedule))
                        .await?;
                }
                Some(mut job) if !job.enabled => {
                    debug!("Fund {} is referenced again, re-enabling its job", fund_id);
                    job.enabled = true;
                    job.updated_at = Utc::now();
                    self.job_store.upsert(job).await?;
                }
                Some(_) => {}
            }
        }

        for mut job in self.job_store.list()? {
            if job.enabled && !tracked.contains(&job.fund_id) {
                debug!("Fund {} no longer referenced, disabling its job", job.fund_id);
                job.enabled = false;
                job.updated_at = Utc::now();
                self.job_store.upsert(job).await?;
            }
        }
        Ok(())
    }

    /// The date range the next sync of a fund should request. Funds with
    /// stored history resume just before their newest point; fresh funds
    /// backfill from inception when the provider knows it.
    async fn plan_window(&self, fund_id: &str, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        let start = match self.nav_store.bounds(fund_id)? {
            Some((_, newest)) => newest - chrono::Duration::days(self.config.overlap_days),
            None => match self.provider.fund_profile(fund_id).await {
                Ok(profile) => profile
                    .inception_date
                    .unwrap_or(today - chrono::Duration::days(self.config.backfill_days)),
                Err(err) => {
                    debug!(
                        "No profile for fund {} ({}), using default backfill depth",
                        fund_id, err
                    );
                    today - chrono::Duration::days(self.config.backfill_days)
                }
            },
        };
        Ok((start.min(today), today))
    }

    async fn run_job(&self, mut job: SyncJob, now: DateTime<Utc>) -> Result<FundSyncOutcome> {
        job.mark_running();
        let mut job = self.job_store.upsert(job).await?;

        // A persisted Running status must not outlive this call: nothing
        // schedules or triggers a Running job again, so an early return
        // here records the failure instead of propagating it raw.
        let (start, end) = match self.plan_window(&job.fund_id, now.date_naive()).await {
            Ok(window) => window,
            Err(err) => {
                job.mark_failed(&err.to_string());
                if let Err(upsert_err) = self.job_store.upsert(job).await {
                    warn!(
                        "Could not record planning failure for fund sync job: {}",
                        upsert_err
                    );
                }
                return Err(err);
            }
        };
        let outcome = self.sync_service.sync_fund(&job.fund_id, start, end).await;
        match outcome.status {
            FundSyncStatus::Success => {
                info!(
                    "NAV sync of fund {} succeeded, {} points",
                    job.fund_id, outcome.points_upserted
                );
                job.mark_success();
            }
            FundSyncStatus::Skipped => {
                job.status = JobStatus::Idle;
                job.updated_at = Utc::now();
            }
            FundSyncStatus::Failed => {
                let error = outcome.error.as_deref().unwrap_or("unknown error");
                warn!("NAV sync of fund {} failed: {}", job.fund_id, error);
                job.mark_failed(error);
            }
        }
        self.job_store.upsert(job).await?;
        Ok(outcome)
    }

    /// Runs every due job, at most `max_concurrent_syncs` at a time.
    pub async fn run_due_jobs(&self, now: DateTime<Utc>) -> Result<Vec<FundSyncOutcome>> {
        self.refresh_tracked_funds().await?;

        let mut due = Vec::new();
        for mut job in self.job_store.list()? {
            if job.is_due(now) {
                job.mark_scheduled();
                due.push(self.job_store.upsert(job).await?);
            }
        }
        if due.is_empty() {
            return Ok(Vec::new());
        }
        debug!("{} sync jobs due", due.len());

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_syncs.max(1)));
        let runs = due.into_iter().map(|job| {
            let semaphore = semaphore.clone();
            async move {
                // The semaphore is never closed, so acquire cannot fail.
                let _permit = semaphore.acquire().await.ok();
                self.run_job(job, now).await
            }
        });

        join_all(runs).await.into_iter().collect()
    }

    /// Syncs one fund immediately, outside its schedule. Coalesces with
    /// an already claimed or running job.
    pub async fn trigger_now(&self, fund_id: &str) -> Result<FundSyncOutcome> {
        let now = Utc::now();
        let job = match self.job_store.get(fund_id)? {
            Some(job) => job,
            None => {
                self.job_store
                    .upsert(SyncJob::new(fund_id, self.config.schedule))
                    .await?
            }
        };

        if !matches!(job.status, JobStatus::Idle) {
            debug!("Fund {} job is {:?}, not triggering", fund_id, job.status);
            return Ok(FundSyncOutcome {
                fund_id: fund_id.to_string(),
                status: FundSyncStatus::Skipped,
                points_upserted: 0,
                attempts: 0,
                error: None,
                transient: false,
            });
        }
        self.run_job(job, now).await
    }

    pub fn job_statuses(&self) -> Result<Vec<SyncJob>> {
        self.job_store.list()
    }

    /// Drives the schedule: wakes every `tick` and runs whatever is due.
    /// Intended to be spawned as a long-lived task.
    pub async fn run_scheduler(&self, tick: Duration) {
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Err(err) = self.run_due_jobs(Utc::now()).await {
                warn!("Scheduler pass failed: {}", err);
            }
        }
    }
}
