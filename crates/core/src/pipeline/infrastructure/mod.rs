pub mod channel_track_finisher;
pub mod logging_track_finisher;
