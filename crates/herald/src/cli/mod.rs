//! Command-line interface module.

mod check_config;
mod commands;
mod replay;

pub use check_config::check_config;
pub use commands::{Cli, Commands};
pub use replay::replay;
