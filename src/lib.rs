pub mod api;
pub mod config;
pub mod error;
pub mod log;
pub mod shell;
pub mod util;

// Decoupled game loop architecture
pub mod actors;
pub mod app;
pub mod render;
pub mod tea;
pub mod ui;

pub use error::{Error, Result};
