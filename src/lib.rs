pub mod args;
pub mod cli;
pub mod command_handlers;
pub mod config;
pub mod console;
pub mod error;
pub mod interrupt;
pub mod ops;
pub mod platform;
pub mod registry;
pub mod session;
pub mod tool;
pub mod tools;
pub mod workspace;

#[cfg(test)]
mod testing;

pub const APP_NAME: &str = "toolsManager";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
