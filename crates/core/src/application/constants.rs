// Engine constants (no magic values at call sites)
use std::time::Duration;

/// Default per-probe deadline (5s)
pub const DEFAULT_PER_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default concurrency bound (0 = unbounded)
pub const DEFAULT_MAX_CONCURRENCY: usize = 0;

/// Default interval between periodic runs (5s)
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(5);

/// Bounded report channel: a lagging subscriber loses the oldest reports
/// instead of stalling the scheduler loop
pub const REPORT_CHANNEL_CAPACITY: usize = 16;
