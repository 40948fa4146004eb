// sharenav-api: Async HTTP clients for server discovery and share listing.

pub mod directory;
pub mod error;
pub mod models;
pub mod server;
pub mod transport;

pub use directory::DirectoryClient;
pub use error::Error;
pub use models::{ServerRecord, ServerRoute, ShareRecord};
pub use server::{SESSION_HEADER, ServerClient};
pub use transport::{TlsMode, TransportConfig};
