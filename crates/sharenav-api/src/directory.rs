// Directory HTTP client
//
// The directory is the account-level service that knows which servers an
// identity owns. It is reached with the identity's bearer token.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::ServerRecord;
use crate::transport::{TransportConfig, decode_json, endpoint};

/// Client for the server directory (`GET {base}/servers`).
#[derive(Clone)]
pub struct DirectoryClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DirectoryClient {
    /// Create a directory client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a directory client with a pre-built `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
        })
    }

    /// The directory base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// List every server registered to the token's identity, active or not.
    pub async fn list_servers(&self, token: &SecretString) -> Result<Vec<ServerRecord>, Error> {
        let url = endpoint(&self.base_url, "servers")?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        decode_json(resp).await
    }
}
