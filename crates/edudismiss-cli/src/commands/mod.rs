pub mod auth;
pub mod board;
pub mod common;
pub mod completions;
pub mod config;
pub mod reset;
pub mod settings;
pub mod status;
pub mod upload;
pub mod watch;
