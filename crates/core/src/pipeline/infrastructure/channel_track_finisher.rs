use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::pipeline::track_finisher::TrackFinisher;
use crate::tracking::domain::expiry_policy::ExpiredTrack;

/// Hands expired tracks to a downstream consumer over a bounded queue.
///
/// Never blocks an expiry worker: when the queue is full the track is
/// dropped and the failure is reported to the caller.
pub struct ChannelTrackFinisher<P> {
    tx: Sender<ExpiredTrack<P>>,
}

impl<P> ChannelTrackFinisher<P> {
    /// Returns the finisher and the receiving end of its queue.
    pub fn bounded(capacity: usize) -> (Self, Receiver<ExpiredTrack<P>>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self { tx }, rx)
    }
}

impl<P: Send + Sync> TrackFinisher<P> for ChannelTrackFinisher<P> {
    fn finish_track(
        &self,
        expired: &ExpiredTrack<P>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match self.tx.try_send(expired.clone()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(dropped)) => Err(format!(
                "finished-track queue full, dropped track {} on camera {}",
                dropped.entry.track_id(),
                dropped.entry.camera_id()
            )
            .into()),
            Err(TrySendError::Disconnected(_)) => Err("finished-track queue closed".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tracking::domain::expiry_policy::ExpiryReason;
    use crate::tracking::domain::track_entry::{CameraId, TrackEntry, TrackId};

    fn expired(track_id: u64) -> ExpiredTrack<&'static str> {
        ExpiredTrack {
            entry: Arc::new(TrackEntry::new(
                CameraId::new("cam_001").unwrap(),
                TrackId::new(track_id),
                "payload",
            )),
            reason: ExpiryReason::MaxAge,
        }
    }

    #[test]
    fn test_forwards_expired_track() {
        let (finisher, rx) = ChannelTrackFinisher::bounded(4);

        finisher.finish_track(&expired(3)).unwrap();

        let received = rx.try_recv().unwrap();
        assert_eq!(received.entry.track_id(), TrackId::new(3));
        assert_eq!(received.reason, ExpiryReason::MaxAge);
    }

    #[test]
    fn test_full_queue_drops_instead_of_blocking() {
        let (finisher, rx) = ChannelTrackFinisher::bounded(1);
        finisher.finish_track(&expired(1)).unwrap();

        let err = finisher.finish_track(&expired(2)).unwrap_err();

        assert!(err.to_string().contains("queue full"));
        assert_eq!(rx.len(), 1);
    }

    #[test]
    fn test_closed_queue_is_an_error() {
        let (finisher, rx) = ChannelTrackFinisher::bounded(1);
        drop(rx);

        assert!(finisher.finish_track(&expired(1)).is_err());
    }
}
