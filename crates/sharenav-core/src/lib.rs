//! Session orchestration between `sharenav-api` and UI consumers.
//!
//! - **[`SessionController`]**: State machine for the whole flow:
//!   identity and token acquisition, server discovery, connection through the
//!   [`ConnectionArbiter`], and share discovery. Drives a passive
//!   [`PresentationSink`] and never reads rendered state back.
//!
//! - **[`EventBus`]**: Single-task publish/subscribe channel. Asynchronous
//!   collaborators enqueue [`Event`]s through an [`EventSender`]; the
//!   [`Session`] runtime dispatches them one at a time.
//!
//! - **Collaborators** ([`collaborator`]): Credential provider, server
//!   discovery, transport client and presentation sink contracts, with
//!   HTTP-backed implementations in [`remote`].

pub mod arbiter;
pub mod bus;
pub mod collaborator;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod event;
pub mod model;
pub mod remote;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use arbiter::{ConnectOutcome, ConnectionArbiter};
pub use bus::{EventBus, EventHandler, EventQueue, EventSender};
pub use collaborator::{CredentialProvider, PresentationSink, ServerDiscovery, TransportClient};
pub use config::{SessionConfig, TlsVerification};
pub use controller::{Collaborators, Phase, SessionController};
pub use error::{CoreError, CredentialError, SessionError};
pub use event::{Event, TokenResult};
pub use remote::{HttpDiscovery, HttpTransport};
pub use session::{Session, SessionEnd, Step};

pub use model::{
    ConnectionMode, ConnectionState, ConnectionStatus, Identity, Server, ServerId, Share, ShareId,
    Token,
};
