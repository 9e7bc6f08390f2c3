// CLI module
// Public interface for the command-line interface

mod args;
mod commands;

pub use args::{verbosity_filter, Cli, Command};
pub use commands::handle_command;
