pub mod expiry_policy;
pub mod registry_error;
pub mod track_entry;
pub mod track_registry;
pub mod track_stats_view;
