use crate::tracking::domain::expiry_policy::ExpiredTrack;

/// Receives tracks that the expiry workers removed from the registry.
///
/// This is a port: the application decides what finishing a track means
/// (publishing its best event, closing a session, ...). Called with no
/// registry lock held.
pub trait TrackFinisher<P>: Send + Sync {
    fn finish_track(
        &self,
        expired: &ExpiredTrack<P>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
