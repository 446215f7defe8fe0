// CLI module - Command line interface
pub mod args;
pub mod commands;
pub mod output;

pub use args::{Args, Command, OutputFormat, TuiArgs};
pub use commands::{execute_command, load_config};
pub use output::ConsoleWriter;
