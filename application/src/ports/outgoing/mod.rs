pub mod admin_directory;
pub mod canvas_state;
pub mod events;
pub mod host_registry;
pub mod persistence;
pub mod shutdown;
pub mod snapshot_codec;
pub mod task_spawn;
pub mod user_directory;
