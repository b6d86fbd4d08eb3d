#[cfg(any(feature = "adapters", feature = "axum", feature = "sqlx", feature = "flate2"))]
compile_error!("canvas_application must not depend on adapters/framework crates");

pub mod admin;
pub mod canvas;
pub mod config;
pub mod error;
pub mod infrastructure_config;
pub mod ports;
pub mod session;
