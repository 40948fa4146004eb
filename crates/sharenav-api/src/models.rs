// Wire records returned by the directory and server endpoints.
//
// These mirror the JSON payloads 1:1. `sharenav-core` converts them into
// its domain model; nothing outside this crate should depend on field
// naming quirks of the wire format.

use serde::{Deserialize, Serialize};

/// One entry of the directory's `GET /servers` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub active: bool,
    /// Opaque per-server session used to reach the relay and share API.
    #[serde(default)]
    pub session: String,
}

/// Addresses a server can be reached on, as reported by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRoute {
    pub local_address: String,
    pub remote_address: String,
}

/// One entry of a server's `GET /shares` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}
