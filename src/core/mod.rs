// Core module - Serial session engine
pub mod controller;
pub mod display;
pub mod framing;
pub mod history;
pub mod observable;
pub mod session;
pub mod transport;

pub use controller::{SessionController, SessionLink, Toggles};
pub use observable::{Observable, SubscriptionId};
pub use session::{PortSession, SessionState};
