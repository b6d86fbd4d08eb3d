pub mod admin;
pub mod canvas;
pub mod color;
pub mod coords;
pub mod economy;
pub mod error;
pub mod events;
pub mod host;
pub mod rate_limiter;
pub mod tile;
pub mod user;
