// Session module - Port session state machine and receive loop
pub mod port;
mod receiver;
pub mod state;

pub use port::{PortSession, DEFAULT_POLL_INTERVAL};
pub use state::SessionState;
