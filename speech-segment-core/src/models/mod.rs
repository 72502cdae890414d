pub mod config;
pub mod credential;
pub mod error;
pub mod format;
pub mod segment;
pub mod state;
pub mod transcript;
