use crate::domain::{config::ConnectionSettings, error::ConnectError};
use std::io::{self, Read, Write};

/// Device name of the built-in loopback port.
pub const LOOPBACK_DEVICE: &str = "loop://";

/// An open serial connection. Owned exclusively by one port session.
pub trait PortHandle: Read + Write + Send {
    /// Number of bytes waiting in the receive buffer.
    fn bytes_to_read(&self) -> io::Result<usize>;
}

/// Opens port handles and enumerates devices.
pub trait PortDriver: Send + Sync {
    /// Apply `settings` and open the device. Must not retry.
    fn open(&self, settings: &ConnectionSettings) -> Result<Box<dyn PortHandle>, ConnectError>;

    /// Device identifiers currently present.
    fn available_ports(&self) -> Vec<String>;
}
