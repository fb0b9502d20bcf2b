use std::collections::HashMap;
use std::sync::Arc;

use crate::tracking::domain::track_registry::TrackRegistry;

/// Point-in-time track counts per camera.
///
/// Built from `get_all_cameras_stats`, so counts of different cameras may
/// have been read at slightly different instants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    per_camera: HashMap<String, usize>,
}

impl RegistryStats {
    pub fn new(per_camera: HashMap<String, usize>) -> Self {
        Self { per_camera }
    }

    pub fn count_for(&self, camera_id: &str) -> usize {
        self.per_camera.get(camera_id).copied().unwrap_or(0)
    }

    pub fn total_tracks(&self) -> usize {
        self.per_camera.values().sum()
    }

    pub fn camera_count(&self) -> usize {
        self.per_camera.len()
    }

    /// `(camera_id, count)` pairs sorted by camera id.
    pub fn cameras(&self) -> Vec<(&str, usize)> {
        let mut cameras: Vec<(&str, usize)> = self
            .per_camera
            .iter()
            .map(|(id, count)| (id.as_str(), *count))
            .collect();
        cameras.sort_unstable_by(|a, b| a.0.cmp(b.0));
        cameras
    }

    /// Camera with the most tracks; ties go to the smallest camera id.
    pub fn busiest_camera(&self) -> Option<(&str, usize)> {
        self.cameras()
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
    }

    /// Returns the formatted report, or `None` if no camera is known.
    pub fn summary_string(&self) -> Option<String> {
        if self.per_camera.is_empty() {
            return None;
        }

        let mut lines = vec![format!(
            "Track registry ({} cameras, {} tracks):",
            self.camera_count(),
            self.total_tracks()
        )];
        for (camera_id, count) in self.cameras() {
            lines.push(format!("  {camera_id:16}: {count:5} tracks"));
        }
        Some(lines.join("\n"))
    }
}

/// Read-only monitoring view over any registry.
pub struct TrackStatsView<P> {
    registry: Arc<dyn TrackRegistry<P>>,
}

impl<P> TrackStatsView<P> {
    pub fn new(registry: Arc<dyn TrackRegistry<P>>) -> Self {
        Self { registry }
    }

    pub fn snapshot(&self) -> RegistryStats {
        RegistryStats::new(self.registry.get_all_cameras_stats())
    }

    pub fn camera_tracks(&self, camera_id: &str) -> usize {
        self.registry.get_camera_tracks_count(camera_id)
    }

    pub fn log_summary(&self) {
        if let Some(text) = self.snapshot().summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
