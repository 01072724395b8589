mod args;
mod commands;
mod handlers;
mod logging;
mod output;
pub mod types;

pub use args::{Cli, Commands, ConfigCommand, SessionCommand};
pub use commands::run;
pub use logging::init_logging;
