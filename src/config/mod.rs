// Re-export all items from the submodules
mod default_configs;
mod snapshot_config;

pub use snapshot_config::{load_or_default, CommandSpec, FileSpec, SnapshotConfig};
