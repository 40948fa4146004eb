// ── Collaborator contracts ──
//
// The session consumes these and never implements them itself. Actions
// are fire-and-forget: their results come back through the `EventSender`
// the implementation was built with. Queries (`list_identities`,
// `is_connected`) answer synchronously and must not have side effects.

use crate::model::{Identity, Server, Share, Token};

/// Platform credential store.
///
/// Results arrive as [`Event::TokenResolved`](crate::Event::TokenResolved).
pub trait CredentialProvider {
    /// Identities of the sharenav account kind, in store order.
    fn list_identities(&self) -> Vec<Identity>;

    /// Register a new identity; resolves with its first token.
    fn create_identity(&self);

    /// Ask for a fresh token for `identity`.
    fn request_token(&self, identity: &Identity);
}

/// Server discovery.
///
/// Results arrive as `ServersLoaded` or `ServersLoadFailed`.
pub trait ServerDiscovery {
    fn fetch_servers(&self, token: &Token);
}

/// Transport to a single server.
///
/// `connect` resolves with `ServerConnected`; `fetch_shares` with
/// `SharesLoaded` or `SharesLoadFailed` for the connected server.
pub trait TransportClient {
    fn connect(&self, server: &Server);
    /// `server` became the target again while still connected. Any
    /// outstanding connect to another server must not take effect.
    fn reuse(&self, _server: &Server) {}
    fn connect_local(&self);
    fn connect_remote(&self);
    fn is_connected(&self, server: &Server) -> bool;
    fn fetch_shares(&self);
}

/// Passive renderer driven by session transitions.
///
/// The session never reads rendered state back. Implementations may call
/// back into the controller from these methods.
pub trait PresentationSink {
    fn show_servers_content(&self, servers: &[Server]);
    fn show_servers_error(&self);
    fn show_shares_content(&self, shares: &[Share]);
    fn show_shares_error(&self);
    /// One-shot notification that the user picked `share`.
    fn share_selected(&self, share: &Share);
    /// The user aborted sign-in; the hosting context should close.
    fn request_close(&self);
}
