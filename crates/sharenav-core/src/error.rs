// ── Core error types ──
//
// User-facing errors from sharenav-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<sharenav_api::Error>`
// impl translates transport-layer errors into domain variants.

use thiserror::Error;

/// Failure reported by a credential provider for an identity or token request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// The user dismissed the sign-in / token dialog.
    #[error("credential request cancelled")]
    Cancelled,

    /// The authenticator rejected or could not complete the request.
    #[error("authenticator failure: {0}")]
    Authenticator(String),

    /// The platform credential store could not be read or written.
    #[error("credential store I/O failure: {0}")]
    Io(String),
}

impl CredentialError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Selection errors ─────────────────────────────────────────────
    #[error("Server not found: {identifier}")]
    ServerNotFound { identifier: String },

    #[error("Share not found: {identifier}")]
    ShareNotFound { identifier: String },

    #[error("Cannot {operation} while {phase}")]
    InvalidState {
        operation: &'static str,
        phase: String,
    },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<sharenav_api::Error> for CoreError {
    fn from(err: sharenav_api::Error) -> Self {
        match err {
            sharenav_api::Error::Unauthorized => CoreError::AuthenticationFailed {
                message: "token or server session rejected".into(),
            },
            sharenav_api::Error::Transport(ref e) => {
                if e.is_connect() || e.is_timeout() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            sharenav_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            sharenav_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            sharenav_api::Error::Status { status, url } => CoreError::Api {
                message: format!("unexpected status from {url}"),
                status: Some(status),
            },
            sharenav_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("Deserialization error: {message}"),
                status: None,
            },
        }
    }
}

/// Why a running session stopped abnormally.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A credential failure with no defined recovery (anything but cancellation).
    #[error("Unrecoverable credential failure: {0}")]
    Credential(#[source] CredentialError),

    /// Every event sender was dropped while the session was still waiting.
    #[error("Event channel closed")]
    ChannelClosed,

    #[error(transparent)]
    Core(#[from] CoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_auth_failure() {
        let err = CoreError::from(sharenav_api::Error::Unauthorized);
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    }

    #[test]
    fn status_keeps_code() {
        let err = CoreError::from(sharenav_api::Error::Status {
            status: 502,
            url: "https://directory.example/servers".into(),
        });
        assert!(matches!(err, CoreError::Api { status: Some(502), .. }));
    }

    #[test]
    fn only_cancelled_is_cancellation() {
        assert!(CredentialError::Cancelled.is_cancellation());
        assert!(!CredentialError::Io("locked".into()).is_cancellation());
    }
}
