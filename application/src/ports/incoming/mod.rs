pub mod admin;
pub mod canvas;
pub mod session;
