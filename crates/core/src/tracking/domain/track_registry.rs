use std::collections::HashMap;
use std::sync::Arc;

use crate::tracking::domain::registry_error::RegistryError;
use crate::tracking::domain::track_entry::TrackEntry;

/// Domain interface for live track storage, keyed by camera then track.
///
/// This is a port: consumers hold an `Arc<dyn TrackRegistry<P>>` and never
/// name a concrete adapter, so an in-memory, persisted or distributed store
/// can be swapped in at construction time.
///
/// Contract shared by every implementation:
/// - `register` upserts (last write wins) and is the only fallible call.
/// - Unknown cameras or tracks are never errors. Lookups come back empty,
///   removals and clears are no-ops, counts are zero.
/// - Collections are returned as copies; single entries as shared immutable
///   references. Callers never get a handle into the store itself.
/// - Operations on one camera are linearizable. Nothing is promised about
///   ordering across cameras, and `get_all_cameras_stats` may be slightly
///   stale under concurrent writes.
pub trait TrackRegistry<P>: Send + Sync {
    /// Insert or replace the entry for `(camera_id, track_id)`.
    ///
    /// Fails with `InvalidArgument`, leaving the registry untouched, when
    /// `camera_id` is empty or `track_id` is negative.
    fn register(&self, camera_id: &str, track_id: i64, payload: P) -> Result<(), RegistryError>;

    fn get(&self, camera_id: &str, track_id: i64) -> Option<Arc<TrackEntry<P>>>;

    /// Snapshot of every entry of one camera, in no particular order.
    fn get_by_camera(&self, camera_id: &str) -> Vec<Arc<TrackEntry<P>>>;

    fn remove(&self, camera_id: &str, track_id: i64);

    /// Drop every entry of one camera. Readers see either all of them or none.
    fn clear_camera(&self, camera_id: &str);

    fn get_camera_tracks_count(&self, camera_id: &str) -> usize;

    /// Entry count per known camera.
    fn get_all_cameras_stats(&self) -> HashMap<String, usize>;
}

/// Behavioural checks any adapter must pass, run by each adapter's tests.
#[cfg(test)]
pub(crate) mod contract {
    use std::sync::Arc;
    use std::thread;

    use super::TrackRegistry;
    use crate::tracking::domain::registry_error::RegistryError;

    fn sorted_ids(registry: &dyn TrackRegistry<String>, camera_id: &str) -> Vec<u64> {
        let mut ids: Vec<u64> = registry
            .get_by_camera(camera_id)
            .iter()
            .map(|e| e.track_id().value())
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn register_then_get(registry: &dyn TrackRegistry<String>) {
        registry.register("cam_001", 1, "bbox-1".into()).unwrap();

        let entry = registry.get("cam_001", 1).unwrap();

        assert_eq!(entry.payload(), "bbox-1");
        assert_eq!(entry.camera_id().as_str(), "cam_001");
        assert_eq!(entry.track_id().value(), 1);
    }

    pub fn unknown_keys_are_absent(registry: &dyn TrackRegistry<String>) {
        registry.register("cam_001", 1, "a".into()).unwrap();

        assert!(registry.get("cam_999", 1).is_none());
        assert!(registry.get("cam_001", 2).is_none());
        assert!(registry.get("cam_001", -1).is_none());
        assert!(registry.get_by_camera("cam_999").is_empty());
        assert_eq!(registry.get_camera_tracks_count("cam_999"), 0);
    }

    pub fn last_write_wins(registry: &dyn TrackRegistry<String>) {
        registry.register("cam_001", 1, "first".into()).unwrap();
        registry.register("cam_001", 1, "second".into()).unwrap();

        assert_eq!(registry.get("cam_001", 1).unwrap().payload(), "second");
        assert_eq!(registry.get_by_camera("cam_001").len(), 1);
        assert_eq!(registry.get_camera_tracks_count("cam_001"), 1);
    }

    pub fn get_by_camera_returns_exact_set(registry: &dyn TrackRegistry<String>) {
        assert!(registry.get_by_camera("cam_001").is_empty());
        for id in 1..=3 {
            registry.register("cam_001", id, format!("t{id}")).unwrap();
        }
        registry.register("cam_002", 9, "other".into()).unwrap();

        assert_eq!(sorted_ids(registry, "cam_001"), vec![1, 2, 3]);
    }

    pub fn remove_is_idempotent(registry: &dyn TrackRegistry<String>) {
        registry.register("cam_001", 1, "a".into()).unwrap();
        registry.register("cam_001", 2, "b".into()).unwrap();

        registry.remove("cam_001", 1);
        registry.remove("cam_001", 1);
        registry.remove("cam_404", 1);

        assert!(registry.get("cam_001", 1).is_none());
        assert_eq!(sorted_ids(registry, "cam_001"), vec![2]);
    }

    pub fn clear_camera_is_scoped(registry: &dyn TrackRegistry<String>) {
        registry.register("cam_001", 1, "a".into()).unwrap();
        registry.register("cam_001", 2, "b".into()).unwrap();
        registry.register("cam_002", 1, "c".into()).unwrap();

        registry.clear_camera("cam_001");
        registry.clear_camera("cam_001");
        registry.clear_camera("cam_404");

        assert_eq!(registry.get_camera_tracks_count("cam_001"), 0);
        assert!(registry.get_by_camera("cam_001").is_empty());
        assert_eq!(registry.get("cam_002", 1).unwrap().payload(), "c");
    }

    pub fn invalid_arguments_leave_state_unchanged(registry: &dyn TrackRegistry<String>) {
        registry.register("cam_001", 1, "kept".into()).unwrap();

        let empty_camera = registry.register("", 1, "x".into());
        let negative_id = registry.register("cam_001", -1, "x".into());

        assert!(matches!(
            empty_camera,
            Err(RegistryError::InvalidArgument { .. })
        ));
        assert!(matches!(negative_id, Err(RegistryError::InvalidArgument { .. })));
        assert_eq!(registry.get_camera_tracks_count("cam_001"), 1);
        assert_eq!(registry.get("cam_001", 1).unwrap().payload(), "kept");
        assert!(!registry.get_all_cameras_stats().contains_key(""));
    }

    pub fn stats_report_known_cameras(registry: &dyn TrackRegistry<String>) {
        registry.register("cam_a", 1, "a".into()).unwrap();
        registry.register("cam_a", 2, "b".into()).unwrap();

        let stats = registry.get_all_cameras_stats();

        assert_eq!(stats.get("cam_a"), Some(&2));
        assert_eq!(stats.get("cam_b").copied().unwrap_or(0), 0);
    }

    pub fn concurrent_writers_lose_nothing(registry: Arc<dyn TrackRegistry<String>>) {
        const WRITERS: i64 = 32;

        let handles: Vec<_> = (0..WRITERS)
            .map(|id| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry
                        .register("cam_001", id, format!("writer-{id}"))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let expected: Vec<u64> = (0..WRITERS as u64).collect();
        assert_eq!(sorted_ids(registry.as_ref(), "cam_001"), expected);
        assert_eq!(registry.get_camera_tracks_count("cam_001"), WRITERS as usize);
    }
}
