// ── Session events ──
//
// Every asynchronous result re-enters the session as one of these. The
// controller never polls a collaborator for completion.

use crate::error::CredentialError;
use crate::model::{Server, ServerId, Share, Token};

/// Outcome of an identity-creation or token request.
///
/// `Ok(None)` means the provider answered without a token; the request is
/// retried against the same identity.
pub type TokenResult = Result<Option<Token>, CredentialError>;

#[derive(Debug, Clone)]
pub enum Event {
    /// A credential provider callback fired.
    TokenResolved(TokenResult),
    /// Server discovery finished. Carries every server, active or not.
    ServersLoaded(Vec<Server>),
    ServersLoadFailed,
    /// The transport finished connecting to the given server.
    ServerConnected(ServerId),
    /// A connect attempt exceeded the configured bound.
    ServerConnectTimedOut { server: ServerId, attempt: u64 },
    /// Shares listed by `server`.
    SharesLoaded { server: ServerId, shares: Vec<Share> },
    /// Share listing for `server` failed.
    SharesLoadFailed(ServerId),
    /// The user picked a share; for collaborators outside the session.
    ShareSelected(Share),
}

impl Event {
    /// Short variant name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TokenResolved(_) => "token-resolved",
            Self::ServersLoaded(_) => "servers-loaded",
            Self::ServersLoadFailed => "servers-load-failed",
            Self::ServerConnected(_) => "server-connected",
            Self::ServerConnectTimedOut { .. } => "server-connect-timed-out",
            Self::SharesLoaded { .. } => "shares-loaded",
            Self::SharesLoadFailed(_) => "shares-load-failed",
            Self::ShareSelected(_) => "share-selected",
        }
    }
}
