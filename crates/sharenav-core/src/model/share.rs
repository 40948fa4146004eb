// ── Share ──

use std::fmt;

use serde::{Deserialize, Serialize};

use super::server::ServerId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareId(String);

impl ShareId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resource exposed by a connected server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub id: ShareId,
    pub name: String,
    /// Server this share was listed from.
    pub server: ServerId,
}

impl Share {
    pub fn new(id: impl Into<String>, name: impl Into<String>, server: ServerId) -> Self {
        Self {
            id: ShareId::new(id),
            name: name.into(),
            server,
        }
    }
}
