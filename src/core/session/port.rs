use crate::core::framing::OutboundFrame;
use crate::core::transport::PortDriver;
use crate::domain::config::{ConnectionOptions, ConnectionSettings};
use crate::domain::error::{ConnectError, SessionError, WriteError};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::receiver::{lock, ReceiveLoop, SharedPort};
use super::state::SessionState;

/// Default interval between receive loop polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One open connection and its receive loop.
struct Link {
    port: SharedPort,
    running: Arc<AtomicBool>,
    fault: Arc<Mutex<Option<String>>>,
    thread: JoinHandle<()>,
}

impl Link {
    /// Tell the loop to stop. Taking the port lock guarantees the loop is not
    /// halfway through queueing a chunk.
    fn stop(&self) {
        let _port = lock(&self.port);
        self.running.store(false, Ordering::SeqCst);
    }

    /// Wait for the loop thread, then release the handle. Returns the fault
    /// that ended the loop, if any.
    fn join(self) -> Option<String> {
        if self.thread.join().is_err() {
            error!("Receive loop panicked");
        }
        drop(self.port);
        let fault = lock(&self.fault).take();
        fault
    }
}

/// Owns the serial handle, the connection state machine, the receive loop and
/// the inbound queue.
///
/// All methods take `&self`; state transitions are checked atomically so
/// overlapping connect or disconnect requests from different threads are
/// rejected instead of interleaved.
pub struct PortSession {
    driver: Arc<dyn PortDriver>,
    state: Mutex<SessionState>,
    settings: Mutex<ConnectionSettings>,
    link: Mutex<Option<Link>>,
    /// Fault of a link torn down after its loop died, until `reap` hands it out.
    lost: Mutex<Option<String>>,
    inbound_tx: mpsc::UnboundedSender<Vec<u8>>,
    inbound_rx: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
    poll_interval: Duration,
}

impl PortSession {
    pub fn new(driver: Arc<dyn PortDriver>, settings: ConnectionSettings) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        Self {
            driver,
            state: Mutex::new(SessionState::Disconnected),
            settings: Mutex::new(settings),
            link: Mutex::new(None),
            lost: Mutex::new(None),
            inbound_tx,
            inbound_rx: Mutex::new(inbound_rx),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Current state. A connection whose receive loop has died is torn down
    /// first, so this never reports Connected without a running loop.
    pub fn state(&self) -> SessionState {
        self.teardown_dead_link();
        *lock(&self.state)
    }

    pub fn settings(&self) -> ConnectionSettings {
        lock(&self.settings).clone()
    }

    /// Legal values for the next connection, with devices enumerated now.
    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions::discover(self.driver.as_ref())
    }

    /// Store settings for the next connect. Only allowed while disconnected.
    pub fn configure(&self, settings: ConnectionSettings) -> Result<(), SessionError> {
        let state = lock(&self.state);
        if *state != SessionState::Disconnected {
            return Err(SessionError::InvalidState {
                operation: "configure",
                state: *state,
            });
        }
        *lock(&self.settings) = settings;
        Ok(())
    }

    /// Open the port with the stored settings and start the receive loop.
    /// On failure the session stays disconnected; nothing is retried.
    pub fn connect(&self) -> Result<(), ConnectError> {
        self.teardown_dead_link();
        if let Some(fault) = lock(&self.lost).take() {
            debug!("Dropping fault of the previous connection: {}", fault);
        }
        self.transition(SessionState::Disconnected, SessionState::Connecting)
            .map_err(ConnectError::InvalidState)?;

        let settings = self.settings();
        info!("Connecting to {}", settings);

        let handle = match self.driver.open(&settings) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Connect to {} failed: {}", settings.device, e);
                self.set_state(SessionState::Disconnected);
                return Err(e);
            }
        };

        let port: SharedPort = Arc::new(Mutex::new(handle));
        let running = Arc::new(AtomicBool::new(true));
        let fault = Arc::new(Mutex::new(None));

        let mut link = lock(&self.link);
        let receiver = ReceiveLoop {
            port: Arc::clone(&port),
            running: Arc::clone(&running),
            fault: Arc::clone(&fault),
            queue: self.inbound_tx.clone(),
            interval: self.poll_interval,
        };

        let thread = match receiver.spawn() {
            Ok(thread) => thread,
            Err(e) => {
                error!("Failed to spawn receive loop: {}", e);
                self.set_state(SessionState::Disconnected);
                return Err(ConnectError::ReceiveLoop(e));
            }
        };

        *link = Some(Link {
            port,
            running,
            fault,
            thread,
        });
        self.set_state(SessionState::Connected);
        info!("Connected to {}", settings);

        Ok(())
    }

    /// Stop the receive loop, wait for it to exit, then close the port.
    pub fn disconnect(&self) -> Result<(), SessionError> {
        let link = {
            let mut guard = lock(&self.link);
            let Some(link) = guard.as_ref() else {
                // The loop died and the link was already torn down; the port
                // is closed either way.
                if let Some(fault) = lock(&self.lost).take() {
                    debug!("Receive loop had already stopped: {}", fault);
                    return Ok(());
                }
                return Err(SessionError::InvalidState {
                    operation: "disconnect",
                    state: *lock(&self.state),
                });
            };

            {
                let _port = lock(&link.port);
                self.transition(SessionState::Connected, SessionState::Disconnecting)
                    .map_err(|state| SessionError::InvalidState {
                        operation: "disconnect",
                        state,
                    })?;
                link.running.store(false, Ordering::SeqCst);
            }

            guard.take()
        };

        if let Some(link) = link {
            if let Some(fault) = link.join() {
                debug!("Receive loop had already stopped: {}", fault);
            }
        }

        self.set_state(SessionState::Disconnected);
        info!("Serial device closed");
        Ok(())
    }

    /// Write one frame and block until the driver accepts it.
    pub fn send(&self, frame: &OutboundFrame) -> Result<(), WriteError> {
        self.teardown_dead_link();
        let port = {
            let link = lock(&self.link);
            match link.as_ref() {
                Some(link) if *lock(&self.state) == SessionState::Connected => {
                    Arc::clone(&link.port)
                }
                _ => return Err(WriteError::NotConnected),
            }
        };

        let mut port = lock(&port);
        port.write_all(frame.as_bytes())?;
        port.flush()?;
        debug!("Sent {} bytes", frame.len());

        Ok(())
    }

    /// Take one received chunk without blocking.
    pub fn try_receive(&self) -> Option<Vec<u8>> {
        lock(&self.inbound_rx).try_recv().ok()
    }

    /// If the receive loop died on its own (device error or closed port), tear
    /// the connection down and return the reason. Each fault is returned once.
    pub fn reap(&self) -> Option<String> {
        self.teardown_dead_link();
        lock(&self.lost).take()
    }

    /// Tear down a link whose loop thread has finished and keep its fault for
    /// `reap`.
    fn teardown_dead_link(&self) {
        let dead = {
            let mut guard = lock(&self.link);
            let finished = guard
                .as_ref()
                .map_or(false, |link| link.thread.is_finished());
            if !finished {
                return;
            }

            if self
                .transition(SessionState::Connected, SessionState::Disconnecting)
                .is_err()
            {
                return;
            }
            match guard.take() {
                Some(link) => link,
                None => return,
            }
        };

        let fault = dead
            .join()
            .unwrap_or_else(|| "receive loop stopped".to_string());
        self.set_state(SessionState::Disconnected);
        warn!("Connection lost: {}", fault);

        *lock(&self.lost) = Some(fault);
    }

    /// True while a receive loop thread exists and has not finished.
    pub fn is_receiving(&self) -> bool {
        lock(&self.link)
            .as_ref()
            .map_or(false, |link| !link.thread.is_finished())
    }

    fn transition(&self, from: SessionState, to: SessionState) -> Result<(), SessionState> {
        let mut state = lock(&self.state);
        if *state != from {
            return Err(*state);
        }
        debug!("Session state {} -> {}", from, to);
        *state = to;
        Ok(())
    }

    fn set_state(&self, to: SessionState) {
        *lock(&self.state) = to;
    }
}

impl Drop for PortSession {
    fn drop(&mut self) {
        if let Some(link) = lock(&self.link).take() {
            link.stop();
            link.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transport::PortHandle;
    use std::collections::VecDeque;
    use std::io::{self, Read};
    use std::time::Instant;

    #[derive(Default)]
    struct Wire {
        incoming: VecDeque<u8>,
        written: Vec<u8>,
        fail_reads: bool,
        fail_writes: bool,
        closed: bool,
    }

    struct ScriptedPort {
        wire: Arc<Mutex<Wire>>,
    }

    impl Read for ScriptedPort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let mut wire = self.wire.lock().unwrap();
            assert!(!wire.closed, "read after close");
            let n = buf.len().min(wire.incoming.len());
            for (slot, byte) in buf.iter_mut().zip(wire.incoming.drain(..n)) {
                *slot = byte;
            }
            Ok(n)
        }
    }

    impl Write for ScriptedPort {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut wire = self.wire.lock().unwrap();
            if wire.fail_writes {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "cable unplugged"));
            }
            wire.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl PortHandle for ScriptedPort {
        fn bytes_to_read(&self) -> io::Result<usize> {
            let wire = self.wire.lock().unwrap();
            if wire.fail_reads {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device removed"));
            }
            Ok(wire.incoming.len())
        }
    }

    impl Drop for ScriptedPort {
        fn drop(&mut self) {
            self.wire.lock().unwrap().closed = true;
        }
    }

    struct ScriptedDriver {
        wire: Arc<Mutex<Wire>>,
        refuse: bool,
    }

    impl PortDriver for ScriptedDriver {
        fn open(
            &self,
            settings: &ConnectionSettings,
        ) -> Result<Box<dyn crate::core::transport::PortHandle>, ConnectError> {
            if self.refuse {
                return Err(ConnectError::Open {
                    device: settings.device.clone(),
                    source: serialport::Error::new(serialport::ErrorKind::NoDevice, "busy"),
                });
            }
            *self.wire.lock().unwrap() = Wire::default();
            Ok(Box::new(ScriptedPort {
                wire: Arc::clone(&self.wire),
            }))
        }

        fn available_ports(&self) -> Vec<String> {
            vec!["/dev/ttyTEST".to_string()]
        }
    }

    fn session(refuse: bool) -> (PortSession, Arc<Mutex<Wire>>) {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let driver = Arc::new(ScriptedDriver {
            wire: Arc::clone(&wire),
            refuse,
        });
        let session = PortSession::new(driver, ConnectionSettings::new("/dev/ttyTEST", 9600))
            .with_poll_interval(Duration::from_millis(1));
        (session, wire)
    }

    fn wait_for<T>(mut probe: impl FnMut() -> Option<T>) -> Option<T> {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if let Some(value) = probe() {
                return Some(value);
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        None
    }

    #[test]
    fn test_connect_and_disconnect() {
        let (session, wire) = session(false);
        assert_eq!(session.state(), SessionState::Disconnected);

        session.connect().unwrap();
        assert_eq!(session.state(), SessionState::Connected);
        assert!(session.is_receiving());

        session.disconnect().unwrap();
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(!session.is_receiving());
        // handle released only after the loop let go of it
        assert!(wire.lock().unwrap().closed);
    }

    #[test]
    fn test_failed_connect_stays_disconnected() {
        let (session, _wire) = session(true);
        let error = session.connect().unwrap_err();

        assert!(matches!(error, ConnectError::Open { .. }));
        assert!(error.to_string().contains("/dev/ttyTEST"));
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(!session.is_receiving());
    }

    #[test]
    fn test_configure_only_while_disconnected() {
        let (session, _wire) = session(false);
        session
            .configure(ConnectionSettings::new("/dev/ttyTEST", 115200))
            .unwrap();
        assert_eq!(session.settings().baud_rate, 115200);

        session.connect().unwrap();
        let error = session
            .configure(ConnectionSettings::new("/dev/ttyOTHER", 9600))
            .unwrap_err();
        assert_eq!(
            error,
            SessionError::InvalidState {
                operation: "configure",
                state: SessionState::Connected
            }
        );
        assert_eq!(session.settings().device, "/dev/ttyTEST");
        session.disconnect().unwrap();
    }

    #[test]
    fn test_double_connect_rejected() {
        let (session, _wire) = session(false);
        session.connect().unwrap();

        assert!(matches!(
            session.connect(),
            Err(ConnectError::InvalidState(SessionState::Connected))
        ));
        session.disconnect().unwrap();
    }

    #[test]
    fn test_disconnect_requires_connection() {
        let (session, _wire) = session(false);
        assert!(matches!(
            session.disconnect(),
            Err(SessionError::InvalidState {
                state: SessionState::Disconnected,
                ..
            })
        ));
    }

    #[test]
    fn test_received_chunks_are_queued() {
        let (session, wire) = session(false);
        session.connect().unwrap();

        wire.lock().unwrap().incoming.extend([0x01, 0x02]);
        let chunk = wait_for(|| session.try_receive()).expect("chunk");
        assert_eq!(chunk, vec![0x01, 0x02]);
        assert_eq!(session.try_receive(), None);

        session.disconnect().unwrap();
    }

    #[test]
    fn test_nothing_queued_after_disconnect() {
        let (session, wire) = session(false);
        session.connect().unwrap();
        session.disconnect().unwrap();

        wire.lock().unwrap().incoming.extend([0x01, 0x02]);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(session.try_receive(), None);
    }

    #[test]
    fn test_send_writes_frame() {
        let (session, wire) = session(false);
        let frame = OutboundFrame::raw(vec![0x68, 0x69]);

        assert!(matches!(session.send(&frame), Err(WriteError::NotConnected)));

        session.connect().unwrap();
        session.send(&frame).unwrap();
        assert_eq!(wire.lock().unwrap().written, vec![0x68, 0x69]);

        wire.lock().unwrap().fail_writes = true;
        assert!(matches!(session.send(&frame), Err(WriteError::Io(_))));
        assert_eq!(session.state(), SessionState::Connected);
        session.disconnect().unwrap();
    }

    #[test]
    fn test_device_fault_is_reaped() {
        let (session, wire) = session(false);
        session.connect().unwrap();
        assert_eq!(session.reap(), None);

        wire.lock().unwrap().fail_reads = true;
        let fault = wait_for(|| session.reap()).expect("fault");

        assert!(fault.contains("device removed"));
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(wire.lock().unwrap().closed);

        // the session can be reconnected afterwards
        session.connect().unwrap();
        assert_eq!(session.state(), SessionState::Connected);
        session.disconnect().unwrap();
    }

    #[test]
    fn test_disconnect_after_loop_exited() {
        let (session, wire) = session(false);
        session.connect().unwrap();
        wire.lock().unwrap().fail_reads = true;

        assert!(wait_for(|| (!session.is_receiving()).then_some(())).is_some());
        session.disconnect().unwrap();
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[test]
    fn test_dead_loop_flips_state_without_reap() {
        let (session, wire) = session(false);
        session.connect().unwrap();
        wire.lock().unwrap().fail_reads = true;
        assert!(wait_for(|| (!session.is_receiving()).then_some(())).is_some());

        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(wire.lock().unwrap().closed);

        let frame = OutboundFrame::raw(vec![0x68, 0x69]);
        assert!(matches!(session.send(&frame), Err(WriteError::NotConnected)));
        assert!(wire.lock().unwrap().written.is_empty());

        // the fault is still handed out, once
        let fault = session.reap().expect("fault");
        assert!(fault.contains("device removed"));
        assert_eq!(session.reap(), None);
    }

    #[test]
    fn test_disconnect_after_dead_link_was_torn_down() {
        let (session, wire) = session(false);
        session.connect().unwrap();
        wire.lock().unwrap().fail_reads = true;
        assert!(wait_for(|| (!session.is_receiving()).then_some(())).is_some());

        assert_eq!(session.state(), SessionState::Disconnected);
        session.disconnect().unwrap();
        assert_eq!(session.reap(), None);
        assert!(session.disconnect().is_err());
    }

    #[test]
    fn test_drop_joins_receive_loop() {
        let (session, wire) = session(false);
        session.connect().unwrap();
        drop(session);
        assert!(wire.lock().unwrap().closed);
    }
}
