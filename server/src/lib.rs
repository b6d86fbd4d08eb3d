pub mod bootstrap;
pub mod config_loader;
pub mod observability;
pub mod workers;
