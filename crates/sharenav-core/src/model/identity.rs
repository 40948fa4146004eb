// ── Identity and token ──

use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Account kind every sharenav identity is registered under.
pub const ACCOUNT_KIND: &str = "sharenav";

/// Opaque credential handle owned by the platform credential store.
///
/// Carries no secret material; tokens are requested per identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub kind: String,
    pub name: String,
}

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            kind: ACCOUNT_KIND.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

/// Short-lived authorization value required for server discovery.
#[derive(Debug, Clone)]
pub struct Token(SecretString);

impl Token {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(SecretString::from(raw.into()))
    }

    pub fn secret(&self) -> &SecretString {
        &self.0
    }
}

impl From<SecretString> for Token {
    fn from(secret: SecretString) -> Self {
        Self(secret)
    }
}
