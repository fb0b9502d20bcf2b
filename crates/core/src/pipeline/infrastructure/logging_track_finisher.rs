use crate::pipeline::track_finisher::TrackFinisher;
use crate::tracking::domain::expiry_policy::ExpiredTrack;

/// Finisher that only records the expiry in the log.
pub struct LoggingTrackFinisher;

impl<P> TrackFinisher<P> for LoggingTrackFinisher {
    fn finish_track(
        &self,
        expired: &ExpiredTrack<P>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        log::info!(
            "Finished track {} on camera {} ({})",
            expired.entry.track_id(),
            expired.entry.camera_id(),
            expired.reason
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tracking::domain::expiry_policy::ExpiryReason;
    use crate::tracking::domain::track_entry::{CameraId, TrackEntry, TrackId};

    #[test]
    fn test_always_succeeds() {
        let expired = ExpiredTrack {
            entry: Arc::new(TrackEntry::new(
                CameraId::new("cam").unwrap(),
                TrackId::new(1),
                (),
            )),
            reason: ExpiryReason::Inactive,
        };
        assert!(LoggingTrackFinisher.finish_track(&expired).is_ok());
    }
}
