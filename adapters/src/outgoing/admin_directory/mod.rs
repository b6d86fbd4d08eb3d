mod config_backed;

pub use config_backed::ConfigAdminDirectoryAdapter;
