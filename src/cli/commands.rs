use crate::cli::args::{Args, Command, ConfigCommand};
use crate::cli::output::ConsoleWriter;
use crate::core::transport::PortDriver;
use crate::domain::config::Bt3Config;
use crate::domain::error::Bt3Result;
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::serial::SystemDriver;

/// Resolve the config manager for `--config` or the per-user file.
pub fn config_manager(args: &Args) -> Bt3Result<ConfigManager> {
    match &args.config {
        Some(path) => Ok(ConfigManager::with_path(path)),
        None => ConfigManager::new(),
    }
}

/// Load the effective configuration, with `--verbose` forcing debug logs.
pub fn load_config(args: &Args) -> Bt3Result<Bt3Config> {
    let mut config = config_manager(args)?.load_config()?;
    if args.verbose {
        config.global.log_level = "debug".to_string();
    }
    Ok(config)
}

/// Execute a non-interactive command
pub fn execute_command(args: &Args, config: &Bt3Config) -> Bt3Result<()> {
    let mut writer = ConsoleWriter::stdout(args.output);

    match args.command() {
        Command::List => {
            let driver = SystemDriver::default();
            let devices = driver.available_ports();
            tracing::debug!("Found {} devices", devices.len());
            writer.write_devices(&devices)?;
        }
        Command::Config(config_args) => match config_args.command {
            ConfigCommand::Init => {
                let manager = config_manager(args)?;
                manager.init_config()?;
                writer.write_message(&format!(
                    "Configuration initialized at '{}'",
                    manager.config_path().display()
                ))?;
            }
            ConfigCommand::Show => writer.write_config(config)?,
        },
        Command::Tui(_) => {
            tracing::warn!("Interactive terminal requested from command dispatcher");
        }
    }

    Ok(())
}
