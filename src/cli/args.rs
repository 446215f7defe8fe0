use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Command line arguments for bt3
#[derive(Parser, Debug)]
#[command(
    name = "bt3",
    version = env!("CARGO_PKG_VERSION"),
    about = "UART terminal for talking to embedded boards",
    long_about = "An interactive serial terminal that frames each entry with optional line endings and checksums and shows received bytes as a hex dump or ASCII."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Command to execute (defaults to the interactive terminal)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive terminal
    Tui(TuiArgs),
    /// List available serial devices
    List,
    /// Configuration management commands
    Config(ConfigArgs),
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
}

/// Startup overrides for the interactive terminal
#[derive(ClapArgs, Debug, Clone, Default, PartialEq, Eq)]
pub struct TuiArgs {
    /// Serial device to preselect
    #[arg(short, long)]
    pub device: Option<String>,

    /// Baud rate to preselect
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Connect immediately on startup
    #[arg(long)]
    pub connect: bool,
}

/// Configuration management arguments
#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Write a default configuration file
    Init,
    /// Show the effective configuration
    Show,
}

impl Args {
    /// The command to run, with the interactive terminal as default.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Tui(TuiArgs::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_tui() {
        let args = Args::try_parse_from(["bt3"]).unwrap();
        assert_eq!(args.command(), Command::Tui(TuiArgs::default()));
        assert_eq!(args.output, OutputFormat::Text);
    }

    #[test]
    fn test_tui_overrides() {
        let args =
            Args::try_parse_from(["bt3", "tui", "--device", "loop://", "-b", "115200", "--connect"])
                .unwrap();
        match args.command() {
            Command::Tui(tui) => {
                assert_eq!(tui.device.as_deref(), Some("loop://"));
                assert_eq!(tui.baud, Some(115200));
                assert!(tui.connect);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_list_with_json_output() {
        let args = Args::try_parse_from(["bt3", "--output", "json", "list"]).unwrap();
        assert_eq!(args.command(), Command::List);
        assert_eq!(args.output, OutputFormat::Json);
    }

    #[test]
    fn test_config_subcommands() {
        let args = Args::try_parse_from(["bt3", "-c", "/tmp/bt3.toml", "config", "init"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/tmp/bt3.toml")));
        assert_eq!(
            args.command(),
            Command::Config(ConfigArgs {
                command: ConfigCommand::Init
            })
        );

        assert!(Args::try_parse_from(["bt3", "config"]).is_err());
    }
}
