use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::core::display::ViewMode;
use crate::core::framing::ChecksumMode;
use crate::core::transport::PortDriver;
use crate::domain::error::ConnectError;

/// Standard baud rates accepted for a connection.
pub const BAUD_RATES: &[u32] = &[
    50, 75, 110, 134, 150, 200, 300, 600, 1200, 1800, 2400, 4800, 9600, 19200, 38400, 57600,
    115200, 230400, 460800, 500000, 576000, 921600, 1000000, 1152000, 1500000, 2000000, 2500000,
    3000000, 3500000, 4000000,
];

/// Character sizes accepted for a connection.
pub const DATA_BITS: &[u8] = &[5, 6, 7, 8];

/// Bt3 configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bt3Config {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Serial settings used when the terminal starts
    #[serde(default)]
    pub serial: SerialDefaults,
    /// Terminal toggles used when the terminal starts
    #[serde(default)]
    pub terminal: TerminalConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log file used while the TUI owns the screen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Interval between receive loop polls in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

/// Serial parameters applied at startup. A missing device selects the first
/// enumerated one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    #[serde(default)]
    pub parity: Parity,
    #[serde(default)]
    pub stop_bits: StopBits,
    #[serde(default)]
    pub flow_control: FlowControl,
}

/// Terminal toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalConfig {
    #[serde(default = "default_true")]
    pub echo: bool,
    #[serde(default)]
    pub cr: bool,
    #[serde(default)]
    pub lf: bool,
    #[serde(default = "default_checksum")]
    pub checksum: ChecksumMode,
    #[serde(default)]
    pub view: ViewMode,
    #[serde(default)]
    pub timestamps: bool,
}

/// Parity configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
    Mark,
    Space,
}

/// Stop bit configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StopBits {
    #[default]
    #[serde(rename = "1")]
    One,
    #[serde(rename = "1.5")]
    OnePointFive,
    #[serde(rename = "2")]
    Two,
}

/// Flow control configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControl {
    Hardware,
    Software,
    #[default]
    None,
}

/// Parameters of one serial connection. Taken by value at connect time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    pub device: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
}

/// Legal values for each [`ConnectionSettings`] field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionOptions {
    pub devices: Vec<String>,
    pub baud_rates: Vec<u32>,
    pub data_bits: Vec<u8>,
    pub parities: Vec<Parity>,
    pub stop_bits: Vec<StopBits>,
    pub flow_controls: Vec<FlowControl>,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval() -> u64 {
    10
}

fn default_baud_rate() -> u32 {
    38400
}

fn default_data_bits() -> u8 {
    8
}

fn default_true() -> bool {
    true
}

fn default_checksum() -> ChecksumMode {
    ChecksumMode::Modulo
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: None,
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl Default for SerialDefaults {
    fn default() -> Self {
        Self {
            device: None,
            baud_rate: default_baud_rate(),
            data_bits: default_data_bits(),
            parity: Parity::default(),
            stop_bits: StopBits::default(),
            flow_control: FlowControl::default(),
        }
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            echo: true,
            cr: false,
            lf: false,
            checksum: default_checksum(),
            view: ViewMode::default(),
            timestamps: false,
        }
    }
}

impl SerialDefaults {
    /// Resolve startup settings against the discovered options.
    pub fn to_settings(&self, options: &ConnectionOptions) -> ConnectionSettings {
        let device = self
            .device
            .clone()
            .or_else(|| options.devices.first().cloned())
            .unwrap_or_default();

        ConnectionSettings {
            device,
            baud_rate: self.baud_rate,
            data_bits: self.data_bits,
            parity: self.parity,
            stop_bits: self.stop_bits,
            flow_control: self.flow_control,
        }
    }
}

impl ConnectionSettings {
    pub fn new(device: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            device: device.into(),
            baud_rate,
            data_bits: default_data_bits(),
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
        }
    }

    /// Check every field against the standard values. Devices are not checked
    /// here; an unknown device fails when it is opened.
    pub fn validate(&self) -> Result<(), ConnectError> {
        if self.device.trim().is_empty() {
            return Err(ConnectError::InvalidSetting("no device selected".to_string()));
        }
        if !BAUD_RATES.contains(&self.baud_rate) {
            return Err(ConnectError::InvalidSetting(format!(
                "unsupported baud rate {}",
                self.baud_rate
            )));
        }
        if !DATA_BITS.contains(&self.data_bits) {
            return Err(ConnectError::InvalidSetting(format!(
                "data bits must be 5-8, got {}",
                self.data_bits
            )));
        }
        Ok(())
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self::new("", default_baud_rate())
    }
}

impl fmt::Display for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{}/{}/{})",
            self.device, self.baud_rate, self.data_bits, self.parity, self.stop_bits
        )
    }
}

impl ConnectionOptions {
    /// Options with devices enumerated by `driver` right now.
    pub fn discover(driver: &dyn PortDriver) -> Self {
        Self::new(driver.available_ports())
    }

    /// Options for the given enumerated devices; everything else is fixed by
    /// the serial standard.
    pub fn new(devices: Vec<String>) -> Self {
        Self {
            devices,
            baud_rates: BAUD_RATES.to_vec(),
            data_bits: DATA_BITS.to_vec(),
            parities: vec![Parity::None, Parity::Odd, Parity::Even, Parity::Mark, Parity::Space],
            stop_bits: vec![StopBits::One, StopBits::OnePointFive, StopBits::Two],
            flow_controls: vec![FlowControl::Hardware, FlowControl::Software, FlowControl::None],
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Parity::None => "N",
            Parity::Odd => "O",
            Parity::Even => "E",
            Parity::Mark => "M",
            Parity::Space => "S",
        };
        f.write_str(code)
    }
}

impl FromStr for Parity {
    type Err = ConnectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "n" | "none" => Ok(Parity::None),
            "o" | "odd" => Ok(Parity::Odd),
            "e" | "even" => Ok(Parity::Even),
            "m" | "mark" => Ok(Parity::Mark),
            "s" | "space" => Ok(Parity::Space),
            other => Err(ConnectError::InvalidSetting(format!("unknown parity '{}'", other))),
        }
    }
}

impl fmt::Display for StopBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopBits::One => "1",
            StopBits::OnePointFive => "1.5",
            StopBits::Two => "2",
        };
        f.write_str(text)
    }
}

impl FromStr for StopBits {
    type Err = ConnectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(StopBits::One),
            "1.5" => Ok(StopBits::OnePointFive),
            "2" => Ok(StopBits::Two),
            other => Err(ConnectError::InvalidSetting(format!("unknown stop bits '{}'", other))),
        }
    }
}

impl fmt::Display for FlowControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FlowControl::Hardware => "hardware",
            FlowControl::Software => "software",
            FlowControl::None => "none",
        };
        f.write_str(text)
    }
}

impl FromStr for FlowControl {
    type Err = ConnectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hardware" | "hw" | "rtscts" => Ok(FlowControl::Hardware),
            "software" | "sw" | "xonxoff" => Ok(FlowControl::Software),
            "none" => Ok(FlowControl::None),
            other => Err(ConnectError::InvalidSetting(format!(
                "unknown flow control '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = Bt3Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: Bt3Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(deserialized.serial.baud_rate, 38400);
        assert_eq!(deserialized.terminal.checksum, ChecksumMode::Modulo);
        assert!(deserialized.terminal.echo);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Bt3Config = toml::from_str(
            r#"
            [serial]
            device = "/dev/ttyACM0"
            stop_bits = "1.5"
            parity = "mark"

            [terminal]
            checksum = "xor"
            lf = true
            "#,
        )
        .unwrap();

        assert_eq!(config.serial.device.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(config.serial.stop_bits, StopBits::OnePointFive);
        assert_eq!(config.serial.parity, Parity::Mark);
        assert_eq!(config.serial.data_bits, 8);
        assert_eq!(config.terminal.checksum, ChecksumMode::Xor);
        assert!(config.terminal.lf);
        assert!(!config.terminal.cr);
        assert_eq!(config.global.poll_interval_ms, 10);
    }

    #[test]
    fn test_settings_display() {
        let settings = ConnectionSettings::new("/dev/ttyUSB0", 38400);
        assert_eq!(settings.to_string(), "/dev/ttyUSB0 (38400/8/N/1)");
    }

    #[test]
    fn test_settings_validation() {
        assert!(ConnectionSettings::new("COM3", 115200).validate().is_ok());

        let bad_baud = ConnectionSettings::new("COM3", 12345);
        assert!(matches!(bad_baud.validate(), Err(ConnectError::InvalidSetting(_))));

        let mut bad_bits = ConnectionSettings::new("COM3", 9600);
        bad_bits.data_bits = 9;
        assert!(bad_bits.validate().is_err());

        assert!(ConnectionSettings::new("  ", 9600).validate().is_err());
    }

    #[test]
    fn test_defaults_pick_first_device() {
        let options = ConnectionOptions::new(vec!["/dev/ttyS0".to_string(), "loop://".to_string()]);
        let settings = SerialDefaults::default().to_settings(&options);
        assert_eq!(settings.device, "/dev/ttyS0");
        assert_eq!(settings.baud_rate, 38400);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("E".parse::<Parity>().unwrap(), Parity::Even);
        assert_eq!("space".parse::<Parity>().unwrap(), Parity::Space);
        assert_eq!("1.5".parse::<StopBits>().unwrap(), StopBits::OnePointFive);
        assert_eq!("rtscts".parse::<FlowControl>().unwrap(), FlowControl::Hardware);
        assert!("x".parse::<Parity>().is_err());
        assert!("3".parse::<StopBits>().is_err());
    }

    #[test]
    fn test_options_cover_standard_values() {
        let options = ConnectionOptions::new(Vec::new());
        assert!(options.baud_rates.contains(&38400));
        assert_eq!(options.data_bits, vec![5, 6, 7, 8]);
        assert_eq!(options.parities.len(), 5);
        assert_eq!(options.stop_bits.len(), 3);
        assert_eq!(options.flow_controls.len(), 3);
    }
}
