pub mod expire_tracks_use_case;
pub mod infrastructure;
pub mod track_finisher;
