// Per-server HTTP client
//
// A server is reached in two steps: the relay resolves its current local
// and remote addresses, then the share API is called on whichever address
// the caller picked. Both steps authenticate with the server's session.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{ServerRoute, ShareRecord};
use crate::transport::{TransportConfig, decode_json, endpoint};

/// Header carrying the per-server session on relay and share requests.
pub const SESSION_HEADER: &str = "X-Server-Session";

/// Client for the relay (`GET {relay}/route`) and share (`GET {addr}/shares`) endpoints.
#[derive(Clone)]
pub struct ServerClient {
    http: reqwest::Client,
    relay_url: Url,
}

impl ServerClient {
    /// Create a server client from a `TransportConfig`.
    pub fn new(relay_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, relay_url })
    }

    /// Create a server client with a pre-built `reqwest::Client`.
    pub fn from_reqwest(relay_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            relay_url: Url::parse(relay_url)?,
        })
    }

    /// The relay base URL.
    pub fn relay_url(&self) -> &Url {
        &self.relay_url
    }

    /// Resolve the local and remote addresses of the server owning `session`.
    pub async fn route(&self, session: &SecretString) -> Result<ServerRoute, Error> {
        let url = endpoint(&self.relay_url, "route")?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .header(SESSION_HEADER, session.expose_secret())
            .send()
            .await?;

        decode_json(resp).await
    }

    /// List the shares exposed by the server at `address`.
    pub async fn list_shares(
        &self,
        address: &str,
        session: &SecretString,
    ) -> Result<Vec<ShareRecord>, Error> {
        let base = Url::parse(address)?;
        let url = endpoint(&base, "shares")?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .header(SESSION_HEADER, session.expose_secret())
            .send()
            .await?;

        decode_json(resp).await
    }
}
