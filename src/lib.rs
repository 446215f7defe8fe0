//! Bt3 Library
//!
//! UART terminal engine: entry framing with line endings and checksums, a
//! port session with a background receive loop, and a controller that
//! publishes status and echo notifications to a shell.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod tui;

pub use crate::core::framing::{ChecksumMode, LineEnding, OutboundFrame};
pub use crate::core::{Observable, PortSession, SessionController, SessionLink, SessionState, Toggles};
pub use crate::domain::config::{Bt3Config, ConnectionOptions, ConnectionSettings};
pub use crate::domain::error::{Bt3Error, Bt3Result};
