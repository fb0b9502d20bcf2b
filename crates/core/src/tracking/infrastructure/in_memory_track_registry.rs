use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::camera_shard::CameraShard;
use crate::tracking::domain::registry_error::RegistryError;
use crate::tracking::domain::track_entry::{CameraId, TrackEntry, TrackId};
use crate::tracking::domain::track_registry::TrackRegistry;

type ShardMap<P> = HashMap<CameraId, Arc<CameraShard<P>>>;

/// Process-local registry sharded by camera.
///
/// Layout: `RwLock<camera -> Arc<CameraShard>>`, each shard behind its own
/// mutex. The outer lock is only held to look up, create or detach a shard;
/// reads and writes of tracks happen under the shard lock alone, so camera
/// pipelines never block one another.
///
/// Cleared cameras are detached from the map entirely. State lives only as
/// long as the process.
pub struct InMemoryTrackRegistry<P> {
    shards: RwLock<ShardMap<P>>,
    pub(super) log_events: bool,
}

impl<P> InMemoryTrackRegistry<P> {
    pub fn new() -> Self {
        Self {
            shards: RwLock::new(HashMap::new()),
            log_events: true,
        }
    }

    /// Same registry without shard, clear or rejection logs. Used for side
    /// tables mirroring a registry that already logs those events.
    pub(crate) fn silent() -> Self {
        Self {
            shards: RwLock::new(HashMap::new()),
            log_events: false,
        }
    }

    fn read_shards(&self) -> RwLockReadGuard<'_, ShardMap<P>> {
        self.shards.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_shards(&self) -> RwLockWriteGuard<'_, ShardMap<P>> {
        self.shards.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn shard(&self, camera_id: &str) -> Option<Arc<CameraShard<P>>> {
        self.read_shards().get(camera_id).cloned()
    }

    fn shard_or_create(&self, camera_id: &CameraId) -> Arc<CameraShard<P>> {
        if let Some(shard) = self.shard(camera_id.as_str()) {
            return shard;
        }
        // Re-checked under the write lock: two writers may race to create.
        let mut shards = self.write_shards();
        Arc::clone(shards.entry(camera_id.clone()).or_insert_with(|| {
            if self.log_events {
                log::debug!("Created track shard for camera {camera_id}");
            }
            Arc::new(CameraShard::new())
        }))
    }

    fn entry_location(
        &self,
        camera_id: &str,
        track_id: i64,
    ) -> Option<(Arc<CameraShard<P>>, TrackId)> {
        let track_id = TrackId::try_from(track_id).ok()?;
        self.shard(camera_id).map(|shard| (shard, track_id))
    }
}

impl<P> Default for InMemoryTrackRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Send + Sync> TrackRegistry<P> for InMemoryTrackRegistry<P> {
    fn register(&self, camera_id: &str, track_id: i64, payload: P) -> Result<(), RegistryError> {
        let keys = CameraId::new(camera_id)
            .and_then(|camera| TrackId::try_from(track_id).map(|track| (camera, track)));
        let (camera, track) = match keys {
            Ok(keys) => keys,
            Err(e) => {
                if self.log_events {
                    log::warn!("Rejected track registration for camera {camera_id:?}: {e}");
                }
                return Err(e);
            }
        };

        let entry = Arc::new(TrackEntry::new(camera, track, payload));
        // A shard retired by a concurrent `clear_camera` is no longer in the
        // map, so the next lookup creates a fresh one.
        loop {
            let shard = self.shard_or_create(entry.camera_id());
            if shard.insert(Arc::clone(&entry)) {
                return Ok(());
            }
        }
    }

    fn get(&self, camera_id: &str, track_id: i64) -> Option<Arc<TrackEntry<P>>> {
        let (shard, track_id) = self.entry_location(camera_id, track_id)?;
        shard.get(track_id)
    }

    fn get_by_camera(&self, camera_id: &str) -> Vec<Arc<TrackEntry<P>>> {
        self.shard(camera_id)
            .map(|shard| shard.snapshot())
            .unwrap_or_default()
    }

    fn remove(&self, camera_id: &str, track_id: i64) {
        if let Some((shard, track_id)) = self.entry_location(camera_id, track_id) {
            shard.remove(track_id);
        }
    }

    fn clear_camera(&self, camera_id: &str) {
        let detached = self.write_shards().remove(camera_id);
        if let Some(shard) = detached {
            let dropped = shard.retire();
            if self.log_events {
                log::info!("Cleared camera {camera_id} ({dropped} tracks dropped)");
            }
        }
    }

    fn get_camera_tracks_count(&self, camera_id: &str) -> usize {
        self.shard(camera_id).map_or(0, |shard| shard.len())
    }

    fn get_all_cameras_stats(&self) -> HashMap<String, usize> {
        let shards: Vec<(String, Arc<CameraShard<P>>)> = self
            .read_shards()
            .iter()
            .map(|(camera_id, shard)| (camera_id.to_string(), Arc::clone(shard)))
            .collect();

        shards
            .into_iter()
            .filter_map(|(camera_id, shard)| shard.live_len().map(|count| (camera_id, count)))
            .collect()
    }
}
