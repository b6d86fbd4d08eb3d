pub mod admin_directory;
pub mod canvas_state;
pub mod events_broadcast;
pub mod host_registry;
pub mod shutdown;
pub mod snapshot_codec;
pub mod sqlite_store;
pub mod tokio_spawn;
pub mod user_directory;
