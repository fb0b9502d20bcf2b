use std::borrow::Borrow;
use std::fmt;

use crate::tracking::domain::registry_error::RegistryError;

/// Identifier of the camera a track was observed on. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CameraId(String);

impl CameraId {
    pub fn new(value: impl Into<String>) -> Result<Self, RegistryError> {
        let value = value.into();
        if value.is_empty() {
            return Err(RegistryError::invalid("camera_id", "must not be empty"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Lets camera-keyed maps be queried with a plain `&str`.
impl Borrow<str> for CameraId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-camera track identifier as assigned by the upstream tracker.
///
/// Trackers hand out signed ids (with `-1` meaning "untracked"), so the
/// conversion from `i64` is where negative ids are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(u64);

impl TrackId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl TryFrom<i64> for TrackId {
    type Error = RegistryError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value).map(Self).map_err(|_| {
            RegistryError::invalid("track_id", format!("must be non-negative, got {value}"))
        })
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Latest reported state of one tracked object.
///
/// Entries are never mutated once stored; an update replaces the whole
/// entry, so readers holding an `Arc<TrackEntry>` see a stable snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackEntry<P> {
    camera_id: CameraId,
    track_id: TrackId,
    payload: P,
}

impl<P> TrackEntry<P> {
    pub fn new(camera_id: CameraId, track_id: TrackId, payload: P) -> Self {
        Self {
            camera_id,
            track_id,
            payload,
        }
    }

    pub fn camera_id(&self) -> &CameraId {
        &self.camera_id
    }

    pub fn track_id(&self) -> TrackId {
        self.track_id
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }
}
