use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection lifecycle of a port session.
///
/// Disconnected -> Connecting -> Connected -> Disconnecting -> Disconnected.
/// A failed connect goes straight from Connecting back to Disconnected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl SessionState {
    pub fn is_connected(self) -> bool {
        matches!(self, SessionState::Connected)
    }

    /// True while a connect or disconnect request is in flight.
    pub fn is_transitioning(self) -> bool {
        matches!(self, SessionState::Connecting | SessionState::Disconnecting)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Disconnected => write!(f, "Disconnected"),
            SessionState::Connecting => write!(f, "Connecting"),
            SessionState::Connected => write!(f, "Connected"),
            SessionState::Disconnecting => write!(f, "Disconnecting"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(SessionState::Connected.is_connected());
        assert!(!SessionState::Connecting.is_connected());
        assert!(SessionState::Connecting.is_transitioning());
        assert!(SessionState::Disconnecting.is_transitioning());
        assert!(!SessionState::Disconnected.is_transitioning());
        assert_eq!(SessionState::default(), SessionState::Disconnected);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::Disconnecting.to_string(), "Disconnecting");
    }
}
