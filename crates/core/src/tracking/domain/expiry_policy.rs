use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::tracking::domain::track_entry::TrackEntry;

/// Why a track was expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryReason {
    /// Not re-registered within `lost_ttl`.
    Inactive,
    /// Alive longer than `active_ttl`, however recently it was seen.
    MaxAge,
}

impl fmt::Display for ExpiryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpiryReason::Inactive => write!(f, "inactive"),
            ExpiryReason::MaxAge => write!(f, "max age"),
        }
    }
}

/// Time-to-live rules applied by the expiring registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    lost_ttl: Duration,
    active_ttl: Duration,
}

impl ExpiryPolicy {
    pub fn new(lost_ttl: Duration, active_ttl: Duration) -> Self {
        Self {
            lost_ttl,
            active_ttl,
        }
    }

    pub fn lost_ttl(&self) -> Duration {
        self.lost_ttl
    }

    pub fn active_ttl(&self) -> Duration {
        self.active_ttl
    }

    /// Inactivity wins over age when both limits are exceeded.
    pub fn evaluate(
        &self,
        first_seen: Instant,
        last_seen: Instant,
        now: Instant,
    ) -> Option<ExpiryReason> {
        if now.saturating_duration_since(last_seen) > self.lost_ttl {
            Some(ExpiryReason::Inactive)
        } else if now.saturating_duration_since(first_seen) > self.active_ttl {
            Some(ExpiryReason::MaxAge)
        } else {
            None
        }
    }
}

/// A track removed by a sweep, with the last state it had.
#[derive(Debug)]
pub struct ExpiredTrack<P> {
    pub entry: Arc<TrackEntry<P>>,
    pub reason: ExpiryReason,
}

// Manual impl: cloning shares the entry, so `P` need not be `Clone`.
impl<P> Clone for ExpiredTrack<P> {
    fn clone(&self) -> Self {
        Self {
            entry: Arc::clone(&self.entry),
            reason: self.reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn policy() -> ExpiryPolicy {
        ExpiryPolicy::new(Duration::from_secs(3), Duration::from_secs(30))
    }

    #[rstest]
    #[case::fresh(0, 0, 1, None)]
    #[case::at_lost_limit(0, 0, 3, None)]
    #[case::lost(0, 0, 4, Some(ExpiryReason::Inactive))]
    #[case::refreshed_but_old(0, 29, 31, Some(ExpiryReason::MaxAge))]
    #[case::at_age_limit(0, 29, 30, None)]
    #[case::both_exceeded(0, 10, 40, Some(ExpiryReason::Inactive))]
    fn test_evaluate(
        #[case] first_offset: u64,
        #[case] last_offset: u64,
        #[case] now_offset: u64,
        #[case] expected: Option<ExpiryReason>,
    ) {
        let base = Instant::now();
        let at = |secs: u64| base + Duration::from_secs(secs);

        let verdict = policy().evaluate(at(first_offset), at(last_offset), at(now_offset));

        assert_eq!(verdict, expected);
    }

    #[test]
    fn test_clock_behind_timestamps_never_expires() {
        let now = Instant::now();
        let later = now + Duration::from_secs(100);
        assert_eq!(policy().evaluate(later, later, now), None);
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(ExpiryReason::Inactive.to_string(), "inactive");
        assert_eq!(ExpiryReason::MaxAge.to_string(), "max age");
    }
}
