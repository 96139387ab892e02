pub mod nav_sync;
pub mod sync_state;
pub mod task_manager;


pub use nav_sync::{FundSyncOutcome, FundSyncStatus, NavSyncService, SyncConfig};
pub use sync_state::{JobStatus, SyncJob, SyncJobStore, SyncSchedule};
pub use task_manager::{TaskManager, TaskManagerConfig};
