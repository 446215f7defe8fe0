// Bt3 - UART terminal for embedded devices
use anyhow::Context;
use bt3::cli::{args::Command, execute_command, load_config, Args};
use bt3::infrastructure::logging::init_logging;
use bt3::tui::App;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(&args).context("Failed to load configuration")?;

    match args.command() {
        Command::Tui(tui_args) => {
            // The terminal owns stdout and stderr, so logs only go to a file.
            if let Some(log_file) = &config.global.log_file {
                init_logging(&config.global.log_level, Some(log_file.as_path()))?;
            }

            let mut app = App::new(&config, &tui_args)?;
            app.run().await?;
        }
        _ => {
            init_logging(&config.global.log_level, None)?;
            execute_command(&args, &config)?;
        }
    }

    Ok(())
}
