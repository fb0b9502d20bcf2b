mod camera_shard;
pub mod expiring_track_registry;
pub mod in_memory_track_registry;
