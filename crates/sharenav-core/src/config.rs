// ── Runtime session configuration ──
//
// These types describe where the directory and relay live and how to
// reach them. They never touch disk; `sharenav-config` builds a
// `SessionConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use sharenav_api::{TlsMode, TransportConfig};
use url::Url;

use crate::model::ConnectionMode;

/// Default bound on a connect that never reports completion.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed home servers).
    DangerAcceptInvalid,
}

/// Configuration for one session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory base URL used for server discovery.
    pub directory_url: Url,
    /// Relay base URL used to resolve server routes.
    pub relay_url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Bound on a pending connect. `None` waits forever.
    pub connect_timeout: Option<Duration>,
    /// Transport path used until the user toggles it.
    pub default_mode: ConnectionMode,
}

impl SessionConfig {
    pub fn new(directory_url: Url, relay_url: Url) -> Self {
        Self {
            directory_url,
            relay_url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            default_mode: ConnectionMode::default(),
        }
    }

    /// Build the api-level transport settings.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}
