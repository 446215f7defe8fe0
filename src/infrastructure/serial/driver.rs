use crate::core::transport::{PortDriver, PortHandle, LOOPBACK_DEVICE};
use crate::domain::config::{ConnectionSettings, FlowControl, Parity, StopBits};
use crate::domain::error::ConnectError;
use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::time::Duration;
use tracing::{debug, warn};

use super::loopback::LoopbackPort;

/// Opens real serial devices through `serialport`, plus `loop://`.
#[derive(Debug, Clone)]
pub struct SystemDriver {
    read_timeout: Duration,
}

impl SystemDriver {
    pub fn new() -> Self {
        Self {
            read_timeout: Duration::from_millis(10),
        }
    }

    pub fn with_read_timeout(read_timeout: Duration) -> Self {
        Self { read_timeout }
    }
}

impl Default for SystemDriver {
    fn default() -> Self {
        Self::new()
    }
}

struct SystemPort {
    inner: Box<dyn SerialPort>,
}

impl Read for SystemPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for SystemPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl PortHandle for SystemPort {
    fn bytes_to_read(&self) -> io::Result<usize> {
        Ok(self.inner.bytes_to_read()? as usize)
    }
}

impl PortDriver for SystemDriver {
    fn open(&self, settings: &ConnectionSettings) -> Result<Box<dyn PortHandle>, ConnectError> {
        settings.validate()?;

        if settings.device == LOOPBACK_DEVICE {
            debug!("Opening loopback port");
            return Ok(Box::new(LoopbackPort::new()));
        }

        let unsupported = |setting: String| ConnectError::Unsupported {
            device: settings.device.clone(),
            setting,
        };

        let data_bits = match settings.data_bits {
            5 => serialport::DataBits::Five,
            6 => serialport::DataBits::Six,
            7 => serialport::DataBits::Seven,
            8 => serialport::DataBits::Eight,
            other => {
                return Err(ConnectError::InvalidSetting(format!(
                    "data bits must be 5-8, got {}",
                    other
                )))
            }
        };

        let parity = match settings.parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
            Parity::Mark | Parity::Space => {
                return Err(unsupported(format!("parity {}", settings.parity)))
            }
        };

        let stop_bits = match settings.stop_bits {
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
            StopBits::OnePointFive => {
                return Err(unsupported(format!("{} stop bits", settings.stop_bits)))
            }
        };

        let flow_control = match settings.flow_control {
            FlowControl::None => serialport::FlowControl::None,
            FlowControl::Software => serialport::FlowControl::Software,
            FlowControl::Hardware => serialport::FlowControl::Hardware,
        };

        let port = serialport::new(&settings.device, settings.baud_rate)
            .data_bits(data_bits)
            .parity(parity)
            .stop_bits(stop_bits)
            .flow_control(flow_control)
            .timeout(self.read_timeout)
            .open()
            .map_err(|source| ConnectError::Open {
                device: settings.device.clone(),
                source,
            })?;

        Ok(Box::new(SystemPort { inner: port }))
    }

    fn available_ports(&self) -> Vec<String> {
        let mut devices = match serialport::available_ports() {
            Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
            Err(e) => {
                warn!("Failed to enumerate serial ports: {}", e);
                Vec::new()
            }
        };
        devices.push(LOOPBACK_DEVICE.to_string());
        devices
    }
}
