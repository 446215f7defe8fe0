use crate::cli::args::OutputFormat;
use crate::domain::config::Bt3Config;
use std::io::{self, Write};
use tabled::{Table, Tabled};

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("TOML serialization error: {0}")]
    TomlError(#[from] toml::ser::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::Bt3Error {
    fn from(err: OutputError) -> Self {
        match err {
            OutputError::IoError(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Device")]
    device: String,
}

/// Writes command results in the selected format.
pub struct ConsoleWriter<W: Write> {
    format: OutputFormat,
    out: W,
}

impl ConsoleWriter<io::Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(format, io::stdout())
    }
}

impl<W: Write> ConsoleWriter<W> {
    pub fn new(format: OutputFormat, out: W) -> Self {
        Self { format, out }
    }

    pub fn write_devices(&mut self, devices: &[String]) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                for device in devices {
                    writeln!(self.out, "{}", device)?;
                }
            }
            OutputFormat::Json => {
                writeln!(self.out, "{}", serde_json::to_string_pretty(devices)?)?;
            }
            OutputFormat::Table => {
                let rows = devices
                    .iter()
                    .enumerate()
                    .map(|(index, device)| DeviceRow {
                        index,
                        device: device.clone(),
                    });
                writeln!(self.out, "{}", Table::new(rows))?;
            }
        }
        Ok(())
    }

    /// Text and table formats print the TOML file content.
    pub fn write_config(&mut self, config: &Bt3Config) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                writeln!(self.out, "{}", serde_json::to_string_pretty(config)?)?;
            }
            OutputFormat::Text | OutputFormat::Table => {
                write!(self.out, "{}", toml::to_string_pretty(config)?)?;
            }
        }
        Ok(())
    }

    pub fn write_message(&mut self, message: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let value = serde_json::json!({ "message": message });
                writeln!(self.out, "{}", value)?;
            }
            _ => writeln!(self.out, "{}", message)?,
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
