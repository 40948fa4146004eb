//! Hidden token entry on the controlling terminal.

use secrecy::SecretString;

use sharenav_config::TokenPrompt;
use sharenav_core::{CredentialError, Identity};

pub struct TerminalPrompt;

impl TokenPrompt for TerminalPrompt {
    fn prompt(&self, identity: &Identity) -> Result<Option<SecretString>, CredentialError> {
        let token = rpassword::prompt_password(format!("Token for {}: ", identity.name))
            .map_err(|e| CredentialError::Io(format!("prompt failed: {e}")))?;
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(SecretString::from(token.to_owned())))
    }
}
