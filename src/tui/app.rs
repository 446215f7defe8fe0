use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::{
    cli::args::TuiArgs,
    core::{session::PortSession, SessionController, Toggles},
    domain::{
        config::{Bt3Config, ConnectionOptions},
        error::{Bt3Error, Bt3Result},
    },
    infrastructure::serial::SystemDriver,
};

use super::{
    event::handle_key_event,
    state::{Action, AppState},
    ui::draw_ui,
};

fn tui_error(e: io::Error) -> Bt3Error {
    Bt3Error::Tui(e.to_string())
}

pub struct App {
    state: AppState,
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    should_quit: bool,
    tick_rate: Duration,
    pending_connect: Option<JoinHandle<bool>>,
    connect_on_start: bool,
}

impl App {
    pub fn new(config: &Bt3Config, args: &TuiArgs) -> Result<Self, Bt3Error> {
        let driver = Arc::new(SystemDriver::default());
        let poll_interval = Duration::from_millis(config.global.poll_interval_ms.max(1));

        let options = ConnectionOptions::discover(driver.as_ref());
        let mut settings = config.serial.to_settings(&options);
        if let Some(device) = &args.device {
            settings.device = device.clone();
        }
        if let Some(baud) = args.baud {
            settings.baud_rate = baud;
        }

        let session =
            Arc::new(PortSession::new(driver, settings.clone()).with_poll_interval(poll_interval));
        let controller = SessionController::new(session, Toggles::from(&config.terminal));
        let state = AppState::new(controller, settings, &config.terminal);

        // Setup terminal
        enable_raw_mode().map_err(tui_error)?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(tui_error)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).map_err(tui_error)?;

        Ok(Self {
            state,
            terminal,
            should_quit: false,
            tick_rate: Duration::from_millis(20),
            pending_connect: None,
            connect_on_start: args.connect,
        })
    }

    pub async fn run(&mut self) -> Bt3Result<()> {
        info!("Terminal started");
        if self.connect_on_start {
            let settings = self.state.settings.clone();
            self.perform(Action::Connect(settings));
        }

        loop {
            self.terminal
                .draw(|f| draw_ui(f, &self.state))
                .map_err(tui_error)?;

            if event::poll(self.tick_rate).map_err(tui_error)? {
                if let Event::Key(key) = event::read().map_err(tui_error)? {
                    if key.kind == KeyEventKind::Press {
                        let action = handle_key_event(key, &mut self.state);
                        self.perform(action);
                    }
                }
            }

            self.finish_connect().await;
            self.state.drain();

            if self.should_quit {
                break;
            }
        }

        if let Some(handle) = self.pending_connect.take() {
            let _ = handle.await;
        }
        if self.state.session_state().is_connected() {
            self.state.link().request_disconnect();
        }

        info!("Terminal stopped");
        Ok(())
    }

    fn perform(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Connect(settings) => {
                if self.pending_connect.is_some() {
                    debug!("Connect already in flight");
                    return;
                }
                let link = self.state.link();
                self.pending_connect = Some(tokio::task::spawn_blocking(move || {
                    link.request_connect(settings)
                }));
            }
            Action::Disconnect => {
                self.state.link().request_disconnect();
            }
            Action::Quit => self.should_quit = true,
        }
    }

    async fn finish_connect(&mut self) {
        let finished = self
            .pending_connect
            .as_ref()
            .map_or(false, |handle| handle.is_finished());
        if !finished {
            return;
        }

        if let Some(handle) = self.pending_connect.take() {
            match handle.await {
                Ok(connected) => debug!("Connect finished, connected: {}", connected),
                Err(e) => error!("Connect task failed: {}", e),
            }
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Restore terminal
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}
