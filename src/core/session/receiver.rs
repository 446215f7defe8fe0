use crate::core::transport::PortHandle;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error};

const READ_CHUNK: usize = 4096;

pub(crate) type SharedPort = Arc<Mutex<Box<dyn PortHandle>>>;

/// Background poller that moves received bytes from the port into the
/// inbound queue.
///
/// `running` is only read and cleared while the port lock is held, so once a
/// stopper has cleared it under that lock no further chunk is queued.
pub(crate) struct ReceiveLoop {
    pub port: SharedPort,
    pub running: Arc<AtomicBool>,
    pub fault: Arc<Mutex<Option<String>>>,
    pub queue: mpsc::UnboundedSender<Vec<u8>>,
    pub interval: Duration,
}

impl ReceiveLoop {
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("bt3-rx".to_string())
            .spawn(move || self.run())
    }

    fn run(self) {
        debug!("Receive loop started");
        let mut buffer = vec![0u8; READ_CHUNK];

        loop {
            match self.poll_once(&mut buffer) {
                Ok(true) => thread::sleep(self.interval),
                Ok(false) => break,
                Err(e) => {
                    error!("Receive loop fault: {}", e);
                    *lock(&self.fault) = Some(e.to_string());
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        debug!("Receive loop exited");
    }

    /// One poll of the port. `Ok(false)` means the loop was told to stop.
    fn poll_once(&self, buffer: &mut [u8]) -> io::Result<bool> {
        let mut port = lock(&self.port);
        if !self.running.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let waiting = port.bytes_to_read()?;
        if waiting == 0 {
            return Ok(true);
        }

        let want = waiting.min(buffer.len());
        match port.read(&mut buffer[..want]) {
            Ok(0) => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "port reported closed",
            )),
            Ok(n) => {
                debug!("Received {} bytes", n);
                // The receiver lives as long as the session; a closed queue
                // means the session is gone.
                Ok(self.queue.send(buffer[..n].to_vec()).is_ok())
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }
}

pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
