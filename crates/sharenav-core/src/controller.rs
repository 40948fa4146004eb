// ── Session controller ──
//
// Drives authentication, server discovery, connection and share discovery.
// Every operation runs in two steps: the model is updated under a short
// borrow and yields a list of effects, then the borrow is released and the
// effects are carried out against collaborators and the presentation sink.
// Collaborators and the sink may therefore call back into the controller.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use strum::Display;
use tracing::{debug, info, warn};

use crate::arbiter::{ConnectOutcome, ConnectionArbiter};
use crate::bus::{EventBus, EventHandler, EventSender};
use crate::collaborator::{CredentialProvider, PresentationSink, ServerDiscovery, TransportClient};
use crate::config::SessionConfig;
use crate::error::{CoreError, CredentialError};
use crate::event::{Event, TokenResult};
use crate::model::{ConnectionMode, ConnectionState, Identity, Server, ServerId, Share, ShareId, Token};

// ── Observable state ─────────────────────────────────────────────

/// Navigational phase of the session, derived from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Phase {
    Unauthenticated,
    AwaitingIdentityCreation,
    AwaitingToken,
    ServersLoading,
    ServersReady,
    ServersFailed,
    SharesLoading,
    SharesReady,
    SharesFailed,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthState {
    Unauthenticated,
    AwaitingIdentityCreation,
    AwaitingToken,
    Authenticated,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed,
}

struct SessionModel {
    auth: AuthState,
    servers_state: LoadState,
    servers: Vec<Server>,
    selected: Option<Server>,
    shares_state: LoadState,
    shares: Vec<Share>,
}

impl SessionModel {
    fn new() -> Self {
        Self {
            auth: AuthState::Unauthenticated,
            servers_state: LoadState::Idle,
            servers: Vec::new(),
            selected: None,
            shares_state: LoadState::Idle,
            shares: Vec::new(),
        }
    }

    fn phase(&self) -> Phase {
        match self.auth {
            AuthState::Unauthenticated => Phase::Unauthenticated,
            AuthState::AwaitingIdentityCreation => Phase::AwaitingIdentityCreation,
            AuthState::AwaitingToken => Phase::AwaitingToken,
            AuthState::Terminated => Phase::Terminated,
            AuthState::Authenticated if self.selected.is_some() => match self.shares_state {
                LoadState::Idle | LoadState::Loading => Phase::SharesLoading,
                LoadState::Ready => Phase::SharesReady,
                LoadState::Failed => Phase::SharesFailed,
            },
            AuthState::Authenticated => match self.servers_state {
                LoadState::Idle | LoadState::Loading => Phase::ServersLoading,
                LoadState::Ready => Phase::ServersReady,
                LoadState::Failed => Phase::ServersFailed,
            },
        }
    }

    fn selected_id(&self) -> Option<&ServerId> {
        self.selected.as_ref().map(|s| &s.id)
    }
}

// ── Effects ──────────────────────────────────────────────────────

/// Outward calls produced by a model step, run after the borrow ends.
enum Effect {
    CreateIdentity,
    RequestToken(Identity),
    FetchServers(Token),
    Connect(Server),
    /// Apply the selected mode to the connected target, then list shares.
    Establish,
    ShowServers(Vec<Server>),
    ShowServersError,
    ShowShares(Vec<Share>),
    ShowSharesError,
    ShareSelected(Share),
    Close,
    Escalate(CredentialError),
}

// ── Controller ───────────────────────────────────────────────────

/// The collaborators a controller drives.
#[derive(Clone)]
pub struct Collaborators {
    pub credentials: Rc<dyn CredentialProvider>,
    pub discovery: Rc<dyn ServerDiscovery>,
    pub transport: Rc<dyn TransportClient>,
    pub sink: Rc<dyn PresentationSink>,
}

/// Session state machine.
///
/// Cheaply cloneable via `Rc<ControllerInner>`; all clones drive the same
/// session. Lives on the dispatch task and is not `Send`.
#[derive(Clone)]
pub struct SessionController {
    inner: Rc<ControllerInner>,
}

struct ControllerInner {
    credentials: Rc<dyn CredentialProvider>,
    discovery: Rc<dyn ServerDiscovery>,
    transport: Rc<dyn TransportClient>,
    sink: Rc<dyn PresentationSink>,
    arbiter: ConnectionArbiter,
    bus: Rc<EventBus>,
    events: EventSender,
    model: RefCell<SessionModel>,
    active: Cell<bool>,
    fault: RefCell<Option<CredentialError>>,
}

impl SessionController {
    pub fn new(config: &SessionConfig, bus: Rc<EventBus>, collaborators: Collaborators) -> Self {
        let events = bus.sender();
        let arbiter = ConnectionArbiter::new(
            Rc::clone(&collaborators.transport),
            events.clone(),
            config.default_mode,
            config.connect_timeout,
        );

        Self {
            inner: Rc::new(ControllerInner {
                credentials: collaborators.credentials,
                discovery: collaborators.discovery,
                transport: collaborators.transport,
                sink: collaborators.sink,
                arbiter,
                bus,
                events,
                model: RefCell::new(SessionModel::new()),
                active: Cell::new(false),
                fault: RefCell::new(None),
            }),
        }
    }

    // ── Activation window ────────────────────────────────────────

    /// Attach to the event channel. Returns `false` if already attached.
    pub fn activate(&self) -> bool {
        if self.inner.active.replace(true) {
            return false;
        }
        let handler: Rc<dyn EventHandler> = self.inner.clone();
        self.inner.bus.subscribe(handler);
        debug!("session controller activated");
        true
    }

    /// Detach from the event channel. Returns `false` if already detached.
    pub fn deactivate(&self) -> bool {
        if !self.inner.active.replace(false) {
            return false;
        }
        let handler: Rc<dyn EventHandler> = self.inner.clone();
        self.inner.bus.unsubscribe(&handler);
        debug!("session controller deactivated");
        true
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }

    // ── Operations ───────────────────────────────────────────────

    /// Begin authentication. Does nothing once the flow has started.
    pub fn start(&self) {
        self.inner.start();
    }

    /// Single entry point for asynchronous results.
    pub fn handle(&self, event: &Event) {
        self.inner.handle(event);
    }

    /// Select an active server by id and begin share discovery for it.
    pub fn select_server(&self, id: &ServerId) -> Result<(), CoreError> {
        self.inner.select_server(|servers| servers.iter().find(|s| &s.id == id), id.as_str())
    }

    /// Select the active server at `index` in the visible list.
    pub fn select_server_at(&self, index: usize) -> Result<(), CoreError> {
        self.inner
            .select_server(|servers| servers.get(index), &index.to_string())
    }

    /// Select a share by id. Notifies collaborators; state is unchanged.
    pub fn select_share(&self, id: &ShareId) -> Result<(), CoreError> {
        self.inner.select_share(|shares| shares.iter().find(|s| &s.id == id), id.as_str())
    }

    /// Select the share at `index` in the visible list.
    pub fn select_share_at(&self, index: usize) -> Result<(), CoreError> {
        self.inner
            .select_share(|shares| shares.get(index), &index.to_string())
    }

    /// Switch between local and remote transport paths.
    pub fn set_mode(&self, mode: ConnectionMode) {
        self.inner.set_mode(mode);
    }

    // ── State observation ────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.inner.model.borrow().phase()
    }

    pub fn is_terminated(&self) -> bool {
        self.phase() == Phase::Terminated
    }

    /// Visible (active-only) server list.
    pub fn servers(&self) -> Vec<Server> {
        self.inner.model.borrow().servers.clone()
    }

    pub fn shares(&self) -> Vec<Share> {
        self.inner.model.borrow().shares.clone()
    }

    pub fn selected_server(&self) -> Option<Server> {
        self.inner.model.borrow().selected.clone()
    }

    pub fn mode(&self) -> ConnectionMode {
        self.inner.arbiter.mode()
    }

    pub fn connection(&self) -> ConnectionState {
        self.inner.arbiter.state()
    }

    /// Take the unrecoverable credential failure, if one was escalated.
    pub fn take_fault(&self) -> Option<CredentialError> {
        self.inner.fault.borrow_mut().take()
    }
}

impl EventHandler for ControllerInner {
    fn on_event(&self, event: &Event) {
        self.handle(event);
    }
}

impl ControllerInner {
    fn start(&self) {
        let effects = {
            let mut model = self.model.borrow_mut();
            if model.auth != AuthState::Unauthenticated {
                debug!(phase = %model.phase(), "start ignored, flow already running");
                return;
            }
            vec![self.authenticate(&mut model)]
        };
        self.run(effects);
    }

    /// Request a token for the first identity, creating one if none exists.
    fn authenticate(&self, model: &mut SessionModel) -> Effect {
        match self.credentials.list_identities().into_iter().next() {
            Some(identity) => {
                model.auth = AuthState::AwaitingToken;
                debug!(identity = %identity, "requesting token");
                Effect::RequestToken(identity)
            }
            None => {
                model.auth = AuthState::AwaitingIdentityCreation;
                info!("no identity found, creating one");
                Effect::CreateIdentity
            }
        }
    }

    fn handle(&self, event: &Event) {
        let effects = {
            let mut model = self.model.borrow_mut();
            if model.auth == AuthState::Terminated {
                debug!(event = event.kind(), "session terminated, event ignored");
                return;
            }
            let before = model.phase();
            let effects = self.step(&mut model, event);
            let after = model.phase();
            if before != after {
                debug!(event = event.kind(), from = %before, to = %after, "transition");
            }
            effects
        };
        self.run(effects);
    }

    fn step(&self, model: &mut SessionModel, event: &Event) -> Vec<Effect> {
        match event {
            Event::TokenResolved(result) => self.on_token(model, result),

            Event::ServersLoaded(servers) => {
                if model.auth != AuthState::Authenticated {
                    return Vec::new();
                }
                let visible: Vec<Server> = servers.iter().filter(|s| s.active).cloned().collect();
                model.servers.clone_from(&visible);
                model.servers_state = LoadState::Ready;
                vec![Effect::ShowServers(visible)]
            }

            Event::ServersLoadFailed => {
                if model.auth != AuthState::Authenticated {
                    return Vec::new();
                }
                warn!("server list failed to load");
                model.servers_state = LoadState::Failed;
                vec![Effect::ShowServersError]
            }

            Event::ServerConnected(id) => {
                if model.selected_id() != Some(id) || !self.arbiter.mark_connected(id) {
                    return Vec::new();
                }
                info!(server = %id, "server connected");
                vec![Effect::Establish]
            }

            Event::ServerConnectTimedOut { server, attempt } => {
                if model.selected_id() != Some(server) || !self.arbiter.expire(server, *attempt) {
                    return Vec::new();
                }
                warn!(server = %server, attempt, "connect timed out");
                model.shares_state = LoadState::Failed;
                model.shares.clear();
                vec![Effect::ShowSharesError]
            }

            Event::SharesLoaded { server, shares } => {
                if !self.is_current(model, server) {
                    debug!(server = %server, "discarding shares of a server that is not connected");
                    return Vec::new();
                }
                if shares.iter().any(|s| &s.server != server) {
                    debug!(server = %server, "discarding shares listed for another server");
                    return Vec::new();
                }
                model.shares.clone_from(shares);
                model.shares_state = LoadState::Ready;
                vec![Effect::ShowShares(shares.clone())]
            }

            Event::SharesLoadFailed(server) => {
                let loading_or_ready =
                    matches!(model.shares_state, LoadState::Loading | LoadState::Ready);
                if !loading_or_ready || !self.is_current(model, server) {
                    return Vec::new();
                }
                warn!(server = %server, "share list failed to load");
                model.shares_state = LoadState::Failed;
                model.shares.clear();
                vec![Effect::ShowSharesError]
            }

            Event::ShareSelected(_) => Vec::new(),
        }
    }

    /// Share results count only for the selected server once connected.
    fn is_current(&self, model: &SessionModel, server: &ServerId) -> bool {
        model.selected_id() == Some(server) && self.arbiter.is_established(server)
    }

    fn on_token(&self, model: &mut SessionModel, result: &TokenResult) -> Vec<Effect> {
        if !matches!(
            model.auth,
            AuthState::AwaitingIdentityCreation | AuthState::AwaitingToken
        ) {
            debug!("token result ignored, not waiting for one");
            return Vec::new();
        }

        match result {
            Ok(Some(token)) => {
                model.auth = AuthState::Authenticated;
                model.servers_state = LoadState::Loading;
                info!("authenticated, loading servers");
                vec![Effect::FetchServers(token.clone())]
            }
            Ok(None) => {
                debug!("token absent, requesting again");
                vec![self.authenticate(model)]
            }
            Err(CredentialError::Cancelled) => {
                info!("sign-in cancelled, closing");
                model.auth = AuthState::Terminated;
                vec![Effect::Close]
            }
            Err(err) => {
                model.auth = AuthState::Terminated;
                vec![Effect::Escalate(err.clone())]
            }
        }
    }

    fn select_server(
        &self,
        pick: impl FnOnce(&[Server]) -> Option<&Server>,
        identifier: &str,
    ) -> Result<(), CoreError> {
        let effects = {
            let mut model = self.model.borrow_mut();
            if model.auth != AuthState::Authenticated {
                return Err(CoreError::InvalidState {
                    operation: "select a server",
                    phase: model.phase().to_string(),
                });
            }
            let server = pick(&model.servers)
                .cloned()
                .ok_or_else(|| CoreError::ServerNotFound {
                    identifier: identifier.to_owned(),
                })?;

            info!(server = %server.id, name = %server.name, "server selected");
            model.selected = Some(server.clone());
            model.shares_state = LoadState::Loading;
            model.shares.clear();
            vec![Effect::Connect(server)]
        };
        self.run(effects);
        Ok(())
    }

    fn select_share(
        &self,
        pick: impl FnOnce(&[Share]) -> Option<&Share>,
        identifier: &str,
    ) -> Result<(), CoreError> {
        let share = {
            let model = self.model.borrow();
            if model.auth == AuthState::Terminated {
                return Err(CoreError::InvalidState {
                    operation: "select a share",
                    phase: model.phase().to_string(),
                });
            }
            pick(&model.shares)
                .cloned()
                .ok_or_else(|| CoreError::ShareNotFound {
                    identifier: identifier.to_owned(),
                })?
        };
        self.run(vec![Effect::ShareSelected(share)]);
        Ok(())
    }

    fn set_mode(&self, mode: ConnectionMode) {
        let effects = {
            let mut model = self.model.borrow_mut();
            if model.auth == AuthState::Terminated {
                return;
            }
            self.arbiter.select_mode(mode);
            info!(%mode, "connection mode selected");

            let Some(server) = model.selected.clone() else {
                return;
            };
            model.shares_state = LoadState::Loading;
            model.shares.clear();
            if self.arbiter.is_connecting(&server.id) {
                // Mode is applied once the pending connect completes.
                Vec::new()
            } else if self.arbiter.is_connected(&server) {
                vec![Effect::Establish]
            } else {
                vec![Effect::Connect(server)]
            }
        };
        self.run(effects);
    }

    // ── Effect execution ─────────────────────────────────────────

    fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::CreateIdentity => self.credentials.create_identity(),
                Effect::RequestToken(identity) => self.credentials.request_token(&identity),
                Effect::FetchServers(token) => self.discovery.fetch_servers(&token),
                Effect::Connect(server) => {
                    if self.arbiter.connect(&server) == ConnectOutcome::AlreadyConnected {
                        self.establish();
                    }
                }
                Effect::Establish => self.establish(),
                Effect::ShowServers(servers) => self.sink.show_servers_content(&servers),
                Effect::ShowServersError => self.sink.show_servers_error(),
                Effect::ShowShares(shares) => self.sink.show_shares_content(&shares),
                Effect::ShowSharesError => self.sink.show_shares_error(),
                Effect::ShareSelected(share) => {
                    debug!(share = %share.id, "share selected");
                    self.sink.share_selected(&share);
                    self.events.send(Event::ShareSelected(share));
                }
                Effect::Close => self.sink.request_close(),
                Effect::Escalate(err) => {
                    warn!(error = %err, "unrecoverable credential failure");
                    *self.fault.borrow_mut() = Some(err);
                }
            }
        }
    }

    fn establish(&self) {
        self.arbiter.apply_mode();
        self.transport.fetch_shares();
    }
}
