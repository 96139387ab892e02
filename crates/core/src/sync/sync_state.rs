//! Per-fund sync job state and scheduling.

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SYNC_HOUR;
use crate::errors::Result;

/// Lifecycle state of a sync job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Waiting for its next window.
    Idle,
    /// Claimed by a scheduler pass, not yet running.
    Scheduled,
    Running,
    /// Terminal state of the last run.
    Success,
    Failed,
}

/// When a job's daily window opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSchedule {
    /// Hour of day, UTC.
    pub hour: u32,
}

impl SyncSchedule {
    pub fn daily(hour: u32) -> Self {
        Self { hour: hour.min(23) }
    }

    /// The most recent time the schedule fired at or before `now`.
    fn last_fire_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let fire_time = NaiveTime::from_hms_opt(self.hour, 0, 0).unwrap_or_default();
        let today = now.date_naive().and_time(fire_time).and_utc();
        if today <= now {
            today
        } else {
            today - chrono::Duration::days(1)
        }
    }

    /// Whether a job with the given last success is due at `now`. A job
    /// is due when its latest window opened after the last success.
    pub fn is_due(&self, last_success_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let window = self.last_fire_time(now);
        match last_success_at {
            Some(at) => at < window,
            None => true,
        }
    }
}

impl Default for SyncSchedule {
    fn default() -> Self {
        Self::daily(DEFAULT_SYNC_HOUR)
    }
}

/// Sync bookkeeping for one tracked fund.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncJob {
    pub fund_id: String,
    pub schedule: SyncSchedule,
    /// Disabled jobs are kept for their history but never scheduled.
    pub enabled: bool,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run_status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_attempt_at: Option<DateTime<Utc>>,
    /// Consecutive failures since the last success.
    pub retry_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SyncJob {
    pub fn new(fund_id: &str, schedule: SyncSchedule) -> Self {
        let now = Utc::now();
        Self {
            fund_id: fund_id.to_string(),
            schedule,
            enabled: true,
            status: JobStatus::Idle,
            last_run_status: None,
            last_success_at: None,
            last_attempt_at: None,
            retry_count: 0,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.enabled
            && matches!(self.status, JobStatus::Idle)
            && self.schedule.is_due(self.last_success_at, now)
    }

    pub fn mark_scheduled(&mut self) {
        self.status = JobStatus::Scheduled;
        self.updated_at = Utc::now();
    }

    pub fn mark_running(&mut self) {
        let now = Utc::now();
        self.status = JobStatus::Running;
        self.last_attempt_at = Some(now);
        self.updated_at = now;
    }

    pub fn mark_success(&mut self) {
        let now = Utc::now();
        self.status = JobStatus::Idle;
        self.last_run_status = Some(JobStatus::Success);
        self.last_success_at = Some(now);
        self.retry_count = 0;
        self.last_error = None;
        self.updated_at = now;
    }

    pub fn mark_failed(&mut self, error: &str) {
        self.status = JobStatus::Idle;
        self.last_run_status = Some(JobStatus::Failed);
        self.retry_count += 1;
        self.last_error = Some(error.to_string());
        self.updated_at = Utc::now();
    }
}

/// Trait defining the contract for sync job storage.
#[async_trait]
pub trait SyncJobStore: Send + Sync {
    /// Inserts or replaces a job keyed by fund ID.
    async fn upsert(&self, job: SyncJob) -> Result<SyncJob>;

    fn get(&self, fund_id: &str) -> Result<Option<SyncJob>>;

    fn list(&self) -> Result<Vec<SyncJob>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn job_with_no_success_is_due() {
        let schedule = SyncSchedule::daily(20);
        assert!(schedule.is_due(None, at(2024, 6, 1, 21)));
        assert!(schedule.is_due(None, at(2024, 6, 1, 8)));
    }

    #[test]
    fn job_is_due_once_per_window() {
        let schedule = SyncSchedule::daily(20);
        // Succeeded after yesterday's window, before today's.
        assert!(!schedule.is_due(Some(at(2024, 6, 1, 21)), at(2024, 6, 2, 8)));
        // Today's window has opened since.
        assert!(schedule.is_due(Some(at(2024, 6, 1, 21)), at(2024, 6, 2, 20)));
        // Already succeeded inside today's window.
        assert!(!schedule.is_due(Some(at(2024, 6, 2, 20)), at(2024, 6, 2, 23)));
    }

    #[test]
    fn disabled_or_busy_jobs_are_never_due() {
        let mut job = SyncJob::new("000001", SyncSchedule::daily(20));
        let now = at(2024, 6, 2, 21);
        assert!(job.is_due(now));

        job.enabled = false;
        assert!(!job.is_due(now));

        job.enabled = true;
        job.mark_running();
        assert!(!job.is_due(now));
    }

    #[test]
    fn success_resets_the_retry_count() {
        let mut job = SyncJob::new("000001", SyncSchedule::default());
        job.mark_failed("network down");
        job.mark_failed("network down");
        assert_eq!(job.retry_count, 2);
        assert_eq!(job.last_run_status, Some(JobStatus::Failed));

        job.mark_success();
        assert_eq!(job.retry_count, 0);
        assert!(job.last_error.is_none());
        assert_eq!(job.last_run_status, Some(JobStatus::Success));
        assert_eq!(job.status, JobStatus::Idle);
    }
}
