//! Live per-camera track state for multi-camera detection pipelines.
//!
//! `tracking::domain` holds the `TrackRegistry` port and its value types,
//! `tracking::infrastructure` the adapters, and `pipeline` the background
//! expiry of tracks that stopped being reported.

pub mod pipeline;
pub mod shared;
pub mod tracking;
