// ── Domain model ──
//
// Canonical types the session flow operates on. Wire records from
// `sharenav-api` are converted into these in `crate::convert`.

pub mod connection;
pub mod identity;
pub mod server;
pub mod share;

pub use connection::{ConnectionMode, ConnectionState, ConnectionStatus};
pub use identity::{ACCOUNT_KIND, Identity, Token};
pub use server::{Server, ServerId};
pub use share::{Share, ShareId};
