// Logging module - Logging infrastructure
use crate::domain::error::{Bt3Error, Bt3Result};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging system.
///
/// `RUST_LOG` overrides `level`. With `log_file` set, output is appended to
/// that file instead of stderr, which the TUI needs to keep the screen intact.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> Bt3Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bt3={},warn", level)));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| Bt3Error::Config {
                    message: format!("Failed to open log file {}: {}", path.display(), e),
                })?;

            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_target(true)
                        .with_thread_names(true),
                )
                .try_init()
        }
        None => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_thread_names(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
    };

    result.map_err(|e| Bt3Error::Config {
        message: format!("Failed to initialize logging: {}", e),
    })?;

    tracing::info!("Bt3 logging system initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_logging_init_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bt3.log");

        // Another test may already have installed the global subscriber.
        let _ = init_logging("debug", Some(&path));
        assert!(path.exists());
    }
}
