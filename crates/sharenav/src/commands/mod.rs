//! Subcommand handlers.

pub mod browse;
pub mod config_cmd;
