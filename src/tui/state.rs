use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::{
    core::{
        display::{render_chunk, timecode, Direction, ViewMode},
        framing::ChecksumMode,
        observable::SubscriptionId,
        session::SessionState,
        SessionController, SessionLink,
    },
    domain::config::{ConnectionOptions, ConnectionSettings, TerminalConfig},
};

use super::input::InputBuffer;

/// Lines kept in the output pane before the oldest are dropped.
pub const MAX_OUTPUT_LINES: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub direction: Direction,
    pub text: String,
}

/// Notifications delivered by the controller's observables, drained on the
/// UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Notice {
    Status(String),
    Echo(Vec<u8>),
}

/// What the key handler asks the app loop to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Connect(ConnectionSettings),
    Disconnect,
    Quit,
}

pub struct AppState {
    pub controller: SessionController,
    /// Settings for the next connect, edited with `:set`.
    pub settings: ConnectionSettings,
    pub options: ConnectionOptions,
    pub view: ViewMode,
    pub timestamps: bool,
    pub output: VecDeque<OutputLine>,
    pub input: InputBuffer,
    pub status_message: Option<String>,
    pub show_help: bool,
    notices: Arc<Mutex<VecDeque<Notice>>>,
    subscriptions: [SubscriptionId; 2],
}

impl AppState {
    pub fn new(
        controller: SessionController,
        settings: ConnectionSettings,
        terminal: &TerminalConfig,
    ) -> Self {
        let notices = Arc::new(Mutex::new(VecDeque::new()));

        let queue = Arc::clone(&notices);
        let status_id = controller.status().subscribe(move |message: &String| {
            push_notice(&queue, Notice::Status(message.clone()));
        });
        let queue = Arc::clone(&notices);
        let echo_id = controller.echo().subscribe(move |bytes: &Vec<u8>| {
            push_notice(&queue, Notice::Echo(bytes.clone()));
        });

        let options = controller.connection_options();

        Self {
            controller,
            settings,
            options,
            view: terminal.view,
            timestamps: terminal.timestamps,
            output: VecDeque::new(),
            input: InputBuffer::new(),
            status_message: Some("Press F1 for help.".to_string()),
            show_help: false,
            notices,
            subscriptions: [status_id, echo_id],
        }
    }

    pub fn link(&self) -> SessionLink {
        self.controller.link()
    }

    pub fn session_state(&self) -> SessionState {
        self.controller.state()
    }

    /// Move pending notifications and every received chunk into the output
    /// pane.
    pub fn drain(&mut self) {
        self.apply_notices();
        while let Some(chunk) = self.controller.poll_inbound() {
            self.put_chunk(&chunk, Direction::Received);
        }
        // A connection lost during the poll reports through the status
        // observable.
        self.apply_notices();
    }

    fn apply_notices(&mut self) {
        let pending: Vec<Notice> = self
            .notices
            .lock()
            .map(|mut queue| queue.drain(..).collect())
            .unwrap_or_default();

        for notice in pending {
            match notice {
                Notice::Status(message) => self.put_status(&message),
                Notice::Echo(bytes) => self.put_chunk(&bytes, Direction::Echoed),
            }
        }
    }

    pub fn put_chunk(&mut self, bytes: &[u8], direction: Direction) {
        match render_chunk(bytes, self.view) {
            Ok(text) => self.put_text(direction, &text),
            Err(message) => self.put_status(&message),
        }
    }

    pub fn put_status(&mut self, message: &str) {
        self.put_text(Direction::Status, &format!("#STATUS: {}", message));
        self.status_message = message.lines().next().map(str::to_string);
    }

    fn put_text(&mut self, direction: Direction, text: &str) {
        let prefix = if self.timestamps {
            format!("[{}] ", timecode())
        } else {
            String::new()
        };

        for (i, line) in text.trim_end_matches('\n').split('\n').enumerate() {
            let line = line.trim_end_matches('\r');
            let text = if i == 0 {
                format!("{}{}", prefix, line)
            } else {
                line.to_string()
            };
            self.output.push_back(OutputLine { direction, text });
        }

        while self.output.len() > MAX_OUTPUT_LINES {
            self.output.pop_front();
        }
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    /// Send the entry line, or run it as a command when it starts with `:`.
    pub fn submit(&mut self) -> Action {
        let entry = self.input.take();
        if let Some(command) = entry.strip_prefix(':') {
            return self.run_command(command);
        }
        self.controller.submit_entry(&entry);
        Action::None
    }

    pub fn history_previous(&mut self) {
        let entry = self.controller.history_previous();
        self.input.replace(entry);
    }

    pub fn history_next(&mut self) {
        let entry = self.controller.history_next();
        self.input.replace(entry);
    }

    /// Connect when disconnected, disconnect when connected.
    pub fn toggle_connection(&mut self) -> Action {
        match self.session_state() {
            SessionState::Disconnected => Action::Connect(self.settings.clone()),
            SessionState::Connected => Action::Disconnect,
            state => {
                self.put_status(&format!("Busy: {}.", state));
                Action::None
            }
        }
    }

    pub fn toggle_view(&mut self) {
        self.view = self.view.toggle();
    }

    pub fn toggle_echo(&mut self) {
        let echo = !self.controller.toggles().echo;
        self.controller.set_echo_enabled(echo);
    }

    pub fn toggle_cr(&mut self) {
        let ending = self.controller.toggles().line_ending;
        self.controller.set_line_ending_flags(!ending.cr, ending.lf);
    }

    pub fn toggle_lf(&mut self) {
        let ending = self.controller.toggles().line_ending;
        self.controller.set_line_ending_flags(ending.cr, !ending.lf);
    }

    /// Flip a checksum button. Enabling one disables the other.
    pub fn toggle_checksum(&mut self, mode: ChecksumMode) {
        let enabled = self.controller.toggles().checksum != mode;
        self.controller.toggle_checksum(mode, enabled);
    }

    pub fn toggle_timestamps(&mut self) {
        self.timestamps = !self.timestamps;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    fn run_command(&mut self, command: &str) -> Action {
        let mut parts = command.split_whitespace();
        match parts.next() {
            Some("set") => {
                let field = parts.next().unwrap_or_default();
                let value = parts.collect::<Vec<_>>().join(" ");
                match self.apply_setting(field, &value) {
                    Ok(()) => {
                        let message = format!("Next connection: {}.", self.settings);
                        self.put_status(&message);
                    }
                    Err(message) => self.put_status(&message),
                }
                Action::None
            }
            Some("devices") => {
                self.options = self.controller.connection_options();
                let message = format!("Devices: {}", self.options.devices.join(", "));
                self.put_status(&message);
                Action::None
            }
            Some("clear") => {
                self.clear_output();
                Action::None
            }
            Some("quit") | Some("q") => Action::Quit,
            Some(other) => {
                self.put_status(&format!("Unknown command: {}", other));
                Action::None
            }
            None => Action::None,
        }
    }

    /// Change one field of the next connection's settings.
    pub fn apply_setting(&mut self, field: &str, value: &str) -> Result<(), String> {
        let state = self.session_state();
        if state != SessionState::Disconnected {
            return Err(format!("Cannot change settings while {}.", state));
        }

        let mut next = self.settings.clone();
        match field {
            "device" | "port" if !value.is_empty() => next.device = value.to_string(),
            "baud" | "speed" => {
                next.baud_rate = parse_option(value, &self.options.baud_rates, "baud rate")?
            }
            "bits" | "databits" => {
                next.data_bits = parse_option(value, &self.options.data_bits, "data bits")?
            }
            "parity" => next.parity = parse_option(value, &self.options.parities, "parity")?,
            "stop" | "stopbits" => {
                next.stop_bits = parse_option(value, &self.options.stop_bits, "stop bits")?
            }
            "flow" => {
                next.flow_control = parse_option(value, &self.options.flow_controls, "flow control")?
            }
            _ => {
                return Err(
                    "Usage: :set device|baud|bits|parity|stop|flow <value>".to_string(),
                )
            }
        }

        self.settings = next;
        Ok(())
    }

    /// One-line summary of settings and toggles.
    pub fn settings_line(&self) -> String {
        let toggles = self.controller.toggles();
        let flag = |on: bool| if on { "on" } else { "off" };
        format!(
            "{} | {} | {} | echo {} | CR {} | LF {} | sum {} | time {}",
            self.settings,
            self.session_state(),
            self.view,
            flag(toggles.echo),
            flag(toggles.line_ending.cr),
            flag(toggles.line_ending.lf),
            toggles.checksum,
            flag(self.timestamps),
        )
    }
}

impl Drop for AppState {
    fn drop(&mut self) {
        self.controller.status().unsubscribe(self.subscriptions[0]);
        self.controller.echo().unsubscribe(self.subscriptions[1]);
    }
}

fn push_notice(queue: &Mutex<VecDeque<Notice>>, notice: Notice) {
    if let Ok(mut queue) = queue.lock() {
        queue.push_back(notice);
    }
}

fn parse_option<T>(value: &str, allowed: &[T], what: &str) -> Result<T, String>
where
    T: std::str::FromStr + PartialEq + Copy,
{
    let parsed = value
        .parse::<T>()
        .map_err(|_| format!("Invalid {}: {:?}", what, value))?;
    if allowed.contains(&parsed) {
        Ok(parsed)
    } else {
        Err(format!("Unsupported {}: {}", what, value))
    }
}
