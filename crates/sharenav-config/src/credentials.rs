// ── Keyring-backed credential provider ──
//
// Tokens live in the OS keyring under service "sharenav", entry
// "<identity>/token". `SHARENAV_TOKEN` overrides the keyring for every
// identity. Store access and prompting run on the blocking pool; results
// come back as `Event::TokenResolved`.

use std::cell::RefCell;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use sharenav_core::{CredentialError, CredentialProvider, Event, EventSender, Identity, Token};

/// Environment variable that overrides stored tokens.
pub const TOKEN_ENV: &str = "SHARENAV_TOKEN";

const KEYRING_SERVICE: &str = "sharenav";
const DEFAULT_ACCOUNT: &str = "default";

/// Keyring entry name for an identity's token.
pub fn keyring_entry(identity: &Identity) -> String {
    format!("{}/token", identity.name)
}

// ── Seams ───────────────────────────────────────────────────────────

/// Persistent token storage.
pub trait TokenStore: Send + Sync {
    fn get(&self, identity: &Identity) -> Result<Option<SecretString>, CredentialError>;
    fn set(&self, identity: &Identity, token: &SecretString) -> Result<(), CredentialError>;
}

/// Interactive token entry. `Ok(None)` means the user backed out.
pub trait TokenPrompt: Send + Sync {
    fn prompt(&self, identity: &Identity) -> Result<Option<SecretString>, CredentialError>;
}

/// [`TokenStore`] over the platform keyring.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringStore;

impl KeyringStore {
    fn entry(identity: &Identity) -> Result<keyring::Entry, CredentialError> {
        keyring::Entry::new(KEYRING_SERVICE, &keyring_entry(identity))
            .map_err(|e| CredentialError::Io(e.to_string()))
    }
}

impl TokenStore for KeyringStore {
    fn get(&self, identity: &Identity) -> Result<Option<SecretString>, CredentialError> {
        match Self::entry(identity)?.get_password() {
            Ok(secret) => Ok(Some(SecretString::from(secret))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(CredentialError::Io(e.to_string())),
        }
    }

    fn set(&self, identity: &Identity, token: &SecretString) -> Result<(), CredentialError> {
        Self::entry(identity)?
            .set_password(token.expose_secret())
            .map_err(|e| CredentialError::Io(e.to_string()))
    }
}

// ── Provider ────────────────────────────────────────────────────────

pub struct KeyringCredentials {
    identities: RefCell<Vec<Identity>>,
    env_token: Option<SecretString>,
    store: Arc<dyn TokenStore>,
    prompt: Arc<dyn TokenPrompt>,
    events: EventSender,
}

impl KeyringCredentials {
    /// Provider over the OS keyring for the configured `account`, honouring
    /// [`TOKEN_ENV`].
    pub fn new(account: Option<&str>, prompt: Arc<dyn TokenPrompt>, events: EventSender) -> Self {
        let env_token = std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .map(SecretString::from);
        Self::with_store(account, env_token, Arc::new(KeyringStore), prompt, events)
    }

    pub fn with_store(
        account: Option<&str>,
        env_token: Option<SecretString>,
        store: Arc<dyn TokenStore>,
        prompt: Arc<dyn TokenPrompt>,
        events: EventSender,
    ) -> Self {
        Self {
            identities: RefCell::new(account.map(Identity::new).into_iter().collect()),
            env_token,
            store,
            prompt,
            events,
        }
    }

    fn resolve(&self, identity: Identity, fresh: bool) {
        let env_token = self.env_token.clone();
        let store = Arc::clone(&self.store);
        let prompt = Arc::clone(&self.prompt);
        let events = self.events.clone();

        tokio::task::spawn_blocking(move || {
            let result = if let Some(token) = env_token {
                debug!(identity = %identity, "using token from {TOKEN_ENV}");
                Ok(Some(Token::from(token)))
            } else {
                obtain(&identity, fresh, store.as_ref(), prompt.as_ref())
            };
            if let Err(ref e) = result {
                warn!(identity = %identity, error = %e, "token request failed");
            }
            events.send(Event::TokenResolved(result));
        });
    }
}

/// Read the stored token, prompting for (and storing) one when absent.
fn obtain(
    identity: &Identity,
    fresh: bool,
    store: &dyn TokenStore,
    prompt: &dyn TokenPrompt,
) -> Result<Option<Token>, CredentialError> {
    if !fresh {
        if let Some(secret) = store.get(identity)? {
            debug!(identity = %identity, "token read from keyring");
            return Ok(Some(Token::from(secret)));
        }
    }

    let Some(secret) = prompt.prompt(identity)? else {
        return Err(CredentialError::Cancelled);
    };
    if secret.expose_secret().is_empty() {
        return Err(CredentialError::Cancelled);
    }
    store.set(identity, &secret)?;
    info!(identity = %identity, "token stored in keyring");
    Ok(Some(Token::from(secret)))
}

impl CredentialProvider for KeyringCredentials {
    fn list_identities(&self) -> Vec<Identity> {
        self.identities.borrow().clone()
    }

    fn create_identity(&self) {
        let identity = Identity::new(DEFAULT_ACCOUNT);
        info!(identity = %identity, "registering identity");
        self.identities.borrow_mut().push(identity.clone());
        self.resolve(identity, true);
    }

    fn request_token(&self, identity: &Identity) {
        self.resolve(identity.clone(), false);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use sharenav_core::{EventBus, EventQueue, TokenResult};

    use super::*;

    #[derive(Default)]
    struct MemoryStore {
        tokens: Mutex<HashMap<String, String>>,
    }

    impl TokenStore for MemoryStore {
        fn get(&self, identity: &Identity) -> Result<Option<SecretString>, CredentialError> {
            let tokens = self.tokens.lock().unwrap();
            Ok(tokens.get(&identity.name).cloned().map(SecretString::from))
        }

        fn set(&self, identity: &Identity, token: &SecretString) -> Result<(), CredentialError> {
            self.tokens
                .lock()
                .unwrap()
                .insert(identity.name.clone(), token.expose_secret().to_owned());
            Ok(())
        }
    }

    struct Answer(Option<&'static str>);

    impl TokenPrompt for Answer {
        fn prompt(&self, _identity: &Identity) -> Result<Option<SecretString>, CredentialError> {
            Ok(self.0.map(SecretString::from))
        }
    }

    fn token_of(result: TokenResult) -> String {
        result
            .unwrap()
            .unwrap()
            .secret()
            .expose_secret()
            .to_owned()
    }

    async fn resolved(queue: &mut EventQueue) -> TokenResult {
        match queue.recv().await.unwrap() {
            Event::TokenResolved(result) => result,
            other => panic!("unexpected event {}", other.kind()),
        }
    }

    #[test]
    fn identities_follow_configured_account() {
        let (bus, _queue) = EventBus::new();
        let store = Arc::new(MemoryStore::default());
        let prompt = Arc::new(Answer(None));
        let none =
            KeyringCredentials::with_store(None, None, store.clone(), prompt.clone(), bus.sender());
        let alice =
            KeyringCredentials::with_store(Some("alice"), None, store, prompt, bus.sender());

        assert!(none.list_identities().is_empty());
        assert_eq!(alice.list_identities(), vec![Identity::new("alice")]);
        assert_eq!(keyring_entry(&Identity::new("alice")), "alice/token");
    }

    #[tokio::test]
    async fn stored_token_is_used_without_prompting() {
        let (bus, mut queue) = EventBus::new();
        let store = Arc::new(MemoryStore::default());
        store
            .set(&Identity::new("alice"), &SecretString::from("stored"))
            .unwrap();
        let credentials = KeyringCredentials::with_store(
            Some("alice"),
            None,
            store,
            Arc::new(Answer(Some("typed"))),
            bus.sender(),
        );

        credentials.request_token(&Identity::new("alice"));

        assert_eq!(token_of(resolved(&mut queue).await), "stored");
    }

    #[tokio::test]
    async fn missing_token_is_prompted_and_stored() {
        let (bus, mut queue) = EventBus::new();
        let store = Arc::new(MemoryStore::default());
        let credentials = KeyringCredentials::with_store(
            Some("alice"),
            None,
            store.clone(),
            Arc::new(Answer(Some("typed"))),
            bus.sender(),
        );

        credentials.request_token(&Identity::new("alice"));

        assert_eq!(token_of(resolved(&mut queue).await), "typed");
        let kept = store.get(&Identity::new("alice")).unwrap().unwrap();
        assert_eq!(kept.expose_secret(), "typed");
    }

    #[tokio::test]
    async fn empty_prompt_cancels() {
        let (bus, mut queue) = EventBus::new();
        let credentials = KeyringCredentials::with_store(
            None,
            None,
            Arc::new(MemoryStore::default()),
            Arc::new(Answer(Some(""))),
            bus.sender(),
        );

        credentials.create_identity();

        let result = resolved(&mut queue).await;
        assert_eq!(result.unwrap_err(), CredentialError::Cancelled);
        assert_eq!(credentials.list_identities(), vec![Identity::new("default")]);
    }

    #[tokio::test]
    async fn env_token_overrides_store() {
        let (bus, mut queue) = EventBus::new();
        let credentials = KeyringCredentials::with_store(
            Some("alice"),
            Some(SecretString::from("from-env")),
            Arc::new(MemoryStore::default()),
            Arc::new(Answer(None)),
            bus.sender(),
        );

        credentials.request_token(&Identity::new("alice"));

        assert_eq!(token_of(resolved(&mut queue).await), "from-env");
    }
}
