/// Seconds without a fresh registration before a track counts as lost.
pub const DEFAULT_LOST_TTL_SECS: u64 = 3;

/// Maximum lifetime of a track in seconds, however often it is refreshed.
pub const DEFAULT_ACTIVE_TTL_SECS: u64 = 30;

/// Pause between two sweeps of one expiry worker.
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 1000;

/// One expiry worker per this many CPUs, with a floor of one worker.
pub const CPUS_PER_EXPIRY_WORKER: usize = 4;
