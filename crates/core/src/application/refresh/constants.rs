// Refresh constants (no magic values)
use std::time::Duration;

/// How often a live estimate is recomputed while the member is in the venue (60s)
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// How often the standing snapshot is re-fetched (30s)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Grace period for background loops to exit after teardown (5s)
pub const TEARDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);
