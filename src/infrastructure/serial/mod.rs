// Serial module - Serial driver and loopback implementation
pub mod driver;
pub mod loopback;

pub use driver::SystemDriver;
pub use loopback::LoopbackPort;
