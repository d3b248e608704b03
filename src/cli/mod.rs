pub mod commands;
pub mod config;

pub use commands::{cmd_scan, cmd_simulate};
pub use config::{AppConfig, Cli, Commands, load_config};
