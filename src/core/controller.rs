//! Session controller: local toggles, entry history and frame construction on
//! top of a [`PortSession`], with results published as notifications.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::framing::{decode_escaped_entry, ChecksumMode, LineEnding, OutboundFrame};
use crate::core::history::EntryHistory;
use crate::core::observable::Observable;
use crate::core::session::{PortSession, SessionState};
use crate::domain::config::{ConnectionOptions, ConnectionSettings, TerminalConfig};
use crate::domain::error::{ConnectError, DecodeError};

/// Framing and echo toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggles {
    pub echo: bool,
    pub line_ending: LineEnding,
    pub checksum: ChecksumMode,
}

impl Default for Toggles {
    fn default() -> Self {
        Self::from(&TerminalConfig::default())
    }
}

impl From<&TerminalConfig> for Toggles {
    fn from(config: &TerminalConfig) -> Self {
        Self {
            echo: config.echo,
            line_ending: LineEnding {
                cr: config.cr,
                lf: config.lf,
            },
            checksum: config.checksum,
        }
    }
}

/// Cloneable handle for connect and disconnect requests.
///
/// Lets a shell run a blocking connect on a worker thread. Overlapping
/// requests are refused by the session's state machine.
#[derive(Clone)]
pub struct SessionLink {
    session: Arc<PortSession>,
    status: Arc<Observable<String>>,
}

impl SessionLink {
    /// Configure and connect. Returns true when the port is open.
    pub fn request_connect(&self, settings: ConnectionSettings) -> bool {
        self.report_lost_connection();
        let state = self.session.state();
        if state != SessionState::Disconnected {
            self.status.set(format!("Cannot connect while {}.", state));
            return false;
        }

        let device = settings.device.clone();
        if let Err(e) = self.session.configure(settings) {
            self.status.set(format!("{}.", e));
            return false;
        }

        match self.session.connect() {
            Ok(()) => {
                self.status
                    .set(format!("Connected to {}.", self.session.settings()));
                true
            }
            Err(ConnectError::InvalidState(state)) => {
                self.status.set(format!("Cannot connect while {}.", state));
                false
            }
            Err(e) => {
                self.status
                    .set(format!("Error while connecting to {}:\n{}", device, e));
                false
            }
        }
    }

    /// Publish `Connection lost: ..` if the receive loop died since the last
    /// check. Returns true when it did.
    fn report_lost_connection(&self) -> bool {
        match self.session.reap() {
            Some(fault) => {
                self.status.set(format!("Connection lost: {}", fault));
                true
            }
            None => false,
        }
    }

    /// Disconnect. Returns true when the port was closed by this call.
    pub fn request_disconnect(&self) -> bool {
        match self.session.disconnect() {
            Ok(()) => {
                self.status.set("Serial device closed.".to_string());
                true
            }
            Err(e) => {
                self.status.set(format!("{}.", e));
                false
            }
        }
    }
}

pub struct SessionController {
    link: SessionLink,
    echo: Arc<Observable<Vec<u8>>>,
    history: EntryHistory,
    toggles: Toggles,
}

impl SessionController {
    pub fn new(session: Arc<PortSession>, toggles: Toggles) -> Self {
        Self {
            link: SessionLink {
                session,
                status: Arc::new(Observable::new()),
            },
            echo: Arc::new(Observable::new()),
            history: EntryHistory::new(),
            toggles,
        }
    }

    pub fn link(&self) -> SessionLink {
        self.link.clone()
    }

    /// Status messages: connection results, errors, closes.
    pub fn status(&self) -> &Arc<Observable<String>> {
        &self.link.status
    }

    /// Outbound frames, published before they are written when echo is on.
    pub fn echo(&self) -> &Arc<Observable<Vec<u8>>> {
        &self.echo
    }

    pub fn session(&self) -> &Arc<PortSession> {
        &self.link.session
    }

    pub fn state(&self) -> SessionState {
        self.link.session.state()
    }

    pub fn connection_options(&self) -> ConnectionOptions {
        self.link.session.connection_options()
    }

    pub fn toggles(&self) -> Toggles {
        self.toggles
    }

    pub fn history(&self) -> &EntryHistory {
        &self.history
    }

    pub fn request_connect(&self, settings: ConnectionSettings) -> bool {
        self.link.request_connect(settings)
    }

    pub fn request_disconnect(&self) -> bool {
        self.link.request_disconnect()
    }

    /// Frame for `raw_text` under the current toggles.
    pub fn build_frame(&self, raw_text: &str) -> Result<OutboundFrame, DecodeError> {
        let payload = decode_escaped_entry(raw_text)?;
        Ok(OutboundFrame::build(
            &payload,
            self.toggles.line_ending,
            self.toggles.checksum,
        ))
    }

    /// Record, decode, frame, echo and send one entry. Failures are published
    /// on the status observable. Returns the frame when it was written.
    pub fn submit_entry(&mut self, raw_text: &str) -> Option<OutboundFrame> {
        self.history.add(raw_text);

        let frame = match self.build_frame(raw_text) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("Rejected entry {:?}: {}", raw_text, e);
                self.link.status.set(e.to_string());
                return None;
            }
        };

        self.link.report_lost_connection();
        if !self.state().is_connected() {
            self.link.status.set("Not connected.".to_string());
            return None;
        }

        if self.toggles.echo {
            self.echo.set(frame.as_bytes().to_vec());
        }

        match self.link.session.send(&frame) {
            Ok(()) => Some(frame),
            Err(e) => {
                warn!("Send failed: {}", e);
                self.link.status.set(e.to_string());
                None
            }
        }
    }

    /// Take at most one received chunk. When the queue is empty, checks
    /// whether the connection was lost and reports it.
    pub fn poll_inbound(&self) -> Option<Vec<u8>> {
        if let Some(chunk) = self.link.session.try_receive() {
            return Some(chunk);
        }

        self.link.report_lost_connection();
        None
    }

    /// Select a checksum mode. Selecting one deselects the other.
    pub fn set_checksum_mode(&mut self, mode: ChecksumMode) {
        info!("Checksum mode: {}", mode);
        self.toggles.checksum = mode;
    }

    /// Turn `mode` on or off as a toolbar toggle would. Turning a mode off only
    /// has an effect while it is the active one.
    pub fn toggle_checksum(&mut self, mode: ChecksumMode, enabled: bool) {
        if enabled {
            self.set_checksum_mode(mode);
        } else if self.toggles.checksum == mode {
            self.set_checksum_mode(ChecksumMode::None);
        }
    }

    pub fn set_line_ending_flags(&mut self, cr: bool, lf: bool) {
        self.toggles.line_ending = LineEnding { cr, lf };
    }

    pub fn set_echo_enabled(&mut self, enabled: bool) {
        self.toggles.echo = enabled;
    }

    /// Step back through submitted entries.
    pub fn history_previous(&mut self) -> String {
        self.history.previous().to_string()
    }

    /// Step forward through submitted entries.
    pub fn history_next(&mut self) -> String {
        self.history.next().to_string()
    }
}
