//! Application-wide constants.

/// Share quantities with an absolute value below this threshold are treated
/// as zero. Matches the four decimal places funds publish shares with.
pub const QUANTITY_THRESHOLD: &str = "0.0001";

/// Name given to the portfolio created alongside every new account.
pub const DEFAULT_PORTFOLIO_NAME: &str = "Default";

/// Hour of day (UTC) at which daily NAV sync jobs fire. Fund companies
/// publish the day's NAV in the evening.
pub const DEFAULT_SYNC_HOUR: u32 = 20;

/// Maximum fetch attempts per NAV page before the failure is recorded.
pub const MAX_FETCH_ATTEMPTS: u32 = 3;

/// Base delay for exponential retry backoff.
pub const BACKOFF_BASE_MS: u64 = 500;

/// Upper bound on a single backoff delay.
pub const BACKOFF_CAP_MS: u64 = 30_000;

/// Maximum random jitter added to each backoff delay.
pub const BACKOFF_JITTER_MS: u64 = 250;

/// Deadline for a single provider fetch; an attempt that exceeds it is
/// abandoned and treated as a transient failure.
pub const FETCH_DEADLINE_SECS: u64 = 30;

/// Days of NAV history requested per fetch. Large ranges are split into
/// pages so a late failure doesn't discard everything already received.
pub const SYNC_PAGE_DAYS: i64 = 90;

/// Days re-fetched before the latest stored NAV, to pick up source
/// corrections of recently published values.
pub const NAV_OVERLAP_DAYS: i64 = 7;

/// Fallback history depth for funds with no stored NAV and no known
/// inception date.
pub const DEFAULT_BACKFILL_DAYS: i64 = 1825;

/// Cap on simultaneous outbound NAV fetches.
pub const MAX_CONCURRENT_SYNCS: usize = 4;
