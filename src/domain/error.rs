use thiserror::Error;

use crate::core::session::SessionState;

/// Failure to bring a serial connection up.
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("Session is {0}, expected Disconnected")]
    InvalidState(SessionState),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("{device}: {setting} is not supported by the serial driver")]
    Unsupported { device: String, setting: String },

    #[error("Failed to open {device}: {source}")]
    Open {
        device: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Failed to start receive loop: {0}")]
    ReceiveLoop(#[source] std::io::Error),
}

/// Failure while writing an outbound frame.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Not connected.")]
    NotConnected,

    #[error("Write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Malformed user entry. Positions are character offsets into the raw entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Non-ASCII character {ch:?} at position {position}")]
    NonAscii { ch: char, position: usize },

    #[error("Truncated escape sequence at position {position}")]
    TruncatedEscape { position: usize },

    #[error("Invalid hex digits {digits:?} in escape at position {position}")]
    InvalidHex { position: usize, digits: String },

    #[error("Escape at position {position} yields {value:#x}, which does not fit in a byte")]
    OutOfRange { position: usize, value: u32 },

    #[error("Unsupported escape {escape:?} at position {position}")]
    UnsupportedEscape { position: usize, escape: String },
}

/// Operation requested in a session state that does not allow it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
}

/// Bt3 unified error type
#[derive(Error, Debug)]
pub enum Bt3Error {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("TUI error: {0}")]
    Tui(String),
}

pub type Bt3Result<T> = Result<T, Bt3Error>;
