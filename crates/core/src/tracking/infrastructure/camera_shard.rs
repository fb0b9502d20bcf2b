use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::tracking::domain::track_entry::{TrackEntry, TrackId};

struct ShardState<P> {
    tracks: HashMap<TrackId, Arc<TrackEntry<P>>>,
    /// Set once the shard has been detached from its registry. A retired
    /// shard is empty and refuses writes so that a writer which resolved it
    /// just before the detach goes back and resolves a fresh one.
    retired: bool,
}

/// Track map of a single camera, guarded by its own lock.
///
/// Every method is one short critical section. Each of them leaves the map
/// valid even if interrupted, so a poisoned lock is recovered rather than
/// propagated.
pub(crate) struct CameraShard<P> {
    state: Mutex<ShardState<P>>,
}

impl<P> CameraShard<P> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ShardState {
                tracks: HashMap::new(),
                retired: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ShardState<P>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Upserts the entry. Returns `false`, storing nothing, if retired.
    pub fn insert(&self, entry: Arc<TrackEntry<P>>) -> bool {
        let mut state = self.lock();
        if state.retired {
            return false;
        }
        state.tracks.insert(entry.track_id(), entry);
        true
    }

    pub fn get(&self, track_id: TrackId) -> Option<Arc<TrackEntry<P>>> {
        self.lock().tracks.get(&track_id).cloned()
    }

    pub fn snapshot(&self) -> Vec<Arc<TrackEntry<P>>> {
        self.lock().tracks.values().cloned().collect()
    }

    pub fn remove(&self, track_id: TrackId) -> Option<Arc<TrackEntry<P>>> {
        self.lock().tracks.remove(&track_id)
    }

    pub fn len(&self) -> usize {
        self.lock().tracks.len()
    }

    /// Entry count, or `None` once the shard has been retired.
    pub fn live_len(&self) -> Option<usize> {
        let state = self.lock();
        (!state.retired).then_some(state.tracks.len())
    }

    /// Drops every entry in one step and refuses further writes.
    /// Returns how many entries were dropped.
    pub fn retire(&self) -> usize {
        let mut state = self.lock();
        state.retired = true;
        let dropped = state.tracks.len();
        state.tracks.clear();
        dropped
    }
}
