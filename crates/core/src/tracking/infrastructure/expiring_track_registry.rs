use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Instant;

use super::in_memory_track_registry::InMemoryTrackRegistry;
use crate::shared::clock::Clock;
use crate::tracking::domain::expiry_policy::{ExpiredTrack, ExpiryPolicy};
use crate::tracking::domain::registry_error::RegistryError;
use crate::tracking::domain::track_entry::{TrackEntry, TrackId};
use crate::tracking::domain::track_registry::TrackRegistry;

#[derive(Debug, Clone, Copy)]
struct EntryLifetime {
    first_seen: Instant,
    last_seen: Instant,
}

/// Decorator that ages entries of any registry and removes stale ones.
///
/// Write instants are kept in a separate table with the same camera/track
/// sharding as the in-memory adapter, so expiry bookkeeping adds no lock
/// shared across cameras. Reads go straight to the inner registry.
///
/// Nothing expires by itself: entries are only removed by `sweep` or
/// `sweep_partition`, usually driven by `ExpireTracksUseCase`.
pub struct ExpiringTrackRegistry<P> {
    inner: Arc<dyn TrackRegistry<P>>,
    lifetimes: InMemoryTrackRegistry<EntryLifetime>,
    policy: ExpiryPolicy,
    clock: Arc<dyn Clock>,
}

impl<P> ExpiringTrackRegistry<P> {
    pub fn new(
        inner: Arc<dyn TrackRegistry<P>>,
        policy: ExpiryPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner,
            lifetimes: InMemoryTrackRegistry::silent(),
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> ExpiryPolicy {
        self.policy
    }

    /// Removes and returns every expired entry.
    pub fn sweep(&self) -> Vec<ExpiredTrack<P>> {
        self.sweep_partition(0, 1)
    }

    /// Sweeps only the cameras assigned to `partition` out of `partitions`.
    ///
    /// Each camera belongs to exactly one partition, so workers sweeping
    /// distinct partitions never report the same track twice.
    pub fn sweep_partition(&self, partition: usize, partitions: usize) -> Vec<ExpiredTrack<P>> {
        let partitions = partitions.max(1);
        let now = self.clock.now();
        let mut expired = Vec::new();

        for camera_id in self.lifetimes.get_all_cameras_stats().into_keys() {
            if partition_of(&camera_id, partitions) != partition {
                continue;
            }
            for lifetime in self.lifetimes.get_by_camera(&camera_id) {
                let Some(track_id) = raw_track_id(lifetime.track_id()) else {
                    continue;
                };
                // Re-read right before removing; the track may have been
                // refreshed since the snapshot was taken.
                let Some(current) = self.lifetimes.get(&camera_id, track_id) else {
                    continue;
                };
                let times = current.payload();
                let Some(reason) = self.policy.evaluate(times.first_seen, times.last_seen, now)
                else {
                    continue;
                };

                // Timestamp row goes first: a register landing in between
                // then leaves at worst a row without an entry, which the
                // next sweep drops, never an entry without a row.
                let entry = self.inner.get(&camera_id, track_id);
                self.lifetimes.remove(&camera_id, track_id);
                self.inner.remove(&camera_id, track_id);

                if let Some(entry) = entry {
                    log::debug!("Expired track {track_id} on camera {camera_id} ({reason})");
                    expired.push(ExpiredTrack { entry, reason });
                }
            }
        }
        expired
    }
}

impl<P: Send + Sync> TrackRegistry<P> for ExpiringTrackRegistry<P> {
    fn register(&self, camera_id: &str, track_id: i64, payload: P) -> Result<(), RegistryError> {
        self.inner.register(camera_id, track_id, payload)?;

        let now = self.clock.now();
        let first_seen = self
            .lifetimes
            .get(camera_id, track_id)
            .map_or(now, |lifetime| lifetime.payload().first_seen);
        self.lifetimes.register(
            camera_id,
            track_id,
            EntryLifetime {
                first_seen,
                last_seen: now,
            },
        )
    }

    fn get(&self, camera_id: &str, track_id: i64) -> Option<Arc<TrackEntry<P>>> {
        self.inner.get(camera_id, track_id)
    }

    fn get_by_camera(&self, camera_id: &str) -> Vec<Arc<TrackEntry<P>>> {
        self.inner.get_by_camera(camera_id)
    }

    // `register` writes the entry before its timestamp, so removals go the
    // other way round. Any interleaving keeps every entry sweepable.
    fn remove(&self, camera_id: &str, track_id: i64) {
        self.lifetimes.remove(camera_id, track_id);
        self.inner.remove(camera_id, track_id);
    }

    fn clear_camera(&self, camera_id: &str) {
        self.lifetimes.clear_camera(camera_id);
        self.inner.clear_camera(camera_id);
    }

    fn get_camera_tracks_count(&self, camera_id: &str) -> usize {
        self.inner.get_camera_tracks_count(camera_id)
    }

    fn get_all_cameras_stats(&self) -> HashMap<String, usize> {
        self.inner.get_all_cameras_stats()
    }
}

fn raw_track_id(track_id: TrackId) -> Option<i64> {
    i64::try_from(track_id.value()).ok()
}

/// Stable within a process, which is all the sweep workers need.
fn partition_of(camera_id: &str, partitions: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    camera_id.hash(&mut hasher);
    (hasher.finish() % partitions as u64) as usize
}
