// ── Server ──

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Identifier of a discovered server, as assigned by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(String);

impl ServerId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A discoverable remote endpoint. Only active servers are selectable.
#[derive(Debug, Clone, Serialize)]
pub struct Server {
    pub id: ServerId,
    pub name: String,
    pub active: bool,
    /// Per-server session used by the transport; never serialized.
    #[serde(skip)]
    pub session: SecretString,
}

impl Server {
    pub fn new(id: impl Into<String>, name: impl Into<String>, active: bool) -> Self {
        Self {
            id: ServerId::new(id),
            name: name.into(),
            active,
            session: SecretString::from(String::new()),
        }
    }

    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = SecretString::from(session.into());
        self
    }
}

impl PartialEq for Server {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.active == other.active
            && self.session.expose_secret() == other.session.expose_secret()
    }
}

impl Eq for Server {}
