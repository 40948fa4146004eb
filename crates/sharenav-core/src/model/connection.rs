// ── Connection state ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::server::Server;

/// Transport path used to reach a server.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    /// Same-network address reported by the relay.
    Local,
    /// Internet-facing address reported by the relay.
    #[default]
    Remote,
}

impl ConnectionMode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Local => Self::Remote,
            Self::Remote => Self::Local,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Idle,
    Connecting { attempt: u64 },
    Connected,
}

/// Connection state owned by the arbiter. One target at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionState {
    pub target: Option<Server>,
    pub mode: ConnectionMode,
    pub status: ConnectionStatus,
}

impl ConnectionState {
    pub fn new(mode: ConnectionMode) -> Self {
        Self {
            target: None,
            mode,
            status: ConnectionStatus::Idle,
        }
    }

    /// Whether `target` is the server with the given id.
    pub fn targets(&self, id: &super::ServerId) -> bool {
        self.target.as_ref().is_some_and(|s| &s.id == id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("local".parse::<ConnectionMode>().unwrap(), ConnectionMode::Local);
        assert_eq!("REMOTE".parse::<ConnectionMode>().unwrap(), ConnectionMode::Remote);
        assert!("tunnel".parse::<ConnectionMode>().is_err());
    }

    #[test]
    fn mode_displays_lowercase() {
        assert_eq!(ConnectionMode::Local.to_string(), "local");
        assert_eq!(ConnectionMode::Remote.toggled(), ConnectionMode::Local);
    }

    #[test]
    fn targets_matches_by_id() {
        let mut state = ConnectionState::new(ConnectionMode::Local);
        assert!(!state.targets(&"1".into()));
        state.target = Some(Server::new("1", "home", true));
        assert!(state.targets(&"1".into()));
        assert!(!state.targets(&"2".into()));
    }
}
