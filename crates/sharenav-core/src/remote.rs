// ── HTTP-backed collaborators ──
//
// Adapters from the `sharenav-api` clients to the collaborator traits.
// Each call spawns a tokio task and reports back on the event channel;
// nothing here blocks the dispatch task.

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use arc_swap::ArcSwap;
use secrecy::SecretString;
use tracing::{debug, warn};

use sharenav_api::{DirectoryClient, ServerClient, ServerRoute};

use crate::bus::EventSender;
use crate::collaborator::{ServerDiscovery, TransportClient};
use crate::config::SessionConfig;
use crate::convert::share_from_record;
use crate::error::CoreError;
use crate::event::Event;
use crate::model::{ConnectionMode, Server, ServerId, Token};

// ── Discovery ────────────────────────────────────────────────────

/// Server discovery through the directory API.
pub struct HttpDiscovery {
    client: DirectoryClient,
    events: EventSender,
}

impl HttpDiscovery {
    pub fn new(config: &SessionConfig, events: EventSender) -> Result<Self, CoreError> {
        let client = DirectoryClient::new(config.directory_url.clone(), &config.transport())?;
        Ok(Self::with_client(client, events))
    }

    pub fn with_client(client: DirectoryClient, events: EventSender) -> Self {
        Self { client, events }
    }
}

impl ServerDiscovery for HttpDiscovery {
    fn fetch_servers(&self, token: &Token) {
        let client = self.client.clone();
        let events = self.events.clone();
        let token = token.secret().clone();

        tokio::spawn(async move {
            match client.list_servers(&token).await {
                Ok(records) => {
                    debug!(count = records.len(), "servers fetched");
                    events.send(Event::ServersLoaded(
                        records.into_iter().map(Server::from).collect(),
                    ));
                }
                Err(e) => {
                    warn!(error = %e, "server discovery failed");
                    events.send(Event::ServersLoadFailed);
                }
            }
        });
    }
}

// ── Transport ────────────────────────────────────────────────────

/// A server the relay has resolved.
struct Route {
    server: ServerId,
    session: SecretString,
    addresses: ServerRoute,
}

/// Resolved route plus the connect generation it belongs to. A route
/// lookup only lands if no newer connect or reuse happened meanwhile.
#[derive(Default)]
struct Slot {
    generation: u64,
    route: Option<Arc<Route>>,
}

/// Transport through the relay and the server's share API.
pub struct HttpTransport {
    client: ServerClient,
    events: EventSender,
    slot: Arc<ArcSwap<Slot>>,
    /// Most recent connect or reuse target.
    target: RefCell<Option<ServerId>>,
    mode: Cell<ConnectionMode>,
}

impl HttpTransport {
    pub fn new(config: &SessionConfig, events: EventSender) -> Result<Self, CoreError> {
        let client = ServerClient::new(config.relay_url.clone(), &config.transport())?;
        Ok(Self::with_client(client, events, config.default_mode))
    }

    pub fn with_client(client: ServerClient, events: EventSender, mode: ConnectionMode) -> Self {
        Self {
            client,
            events,
            slot: Arc::new(ArcSwap::from_pointee(Slot::default())),
            target: RefCell::new(None),
            mode: Cell::new(mode),
        }
    }

    /// Base address for the current mode, if a route is known.
    pub fn current_address(&self) -> Option<String> {
        self.route().map(|r| self.address_of(&r))
    }

    fn route(&self) -> Option<Arc<Route>> {
        self.slot.load().route.clone()
    }

    fn address_of(&self, route: &Route) -> String {
        match self.mode.get() {
            ConnectionMode::Local => route.addresses.local_address.clone(),
            ConnectionMode::Remote => route.addresses.remote_address.clone(),
        }
    }

    /// Start a new generation, keeping the current route. Returns it.
    fn bump(&self, target: &ServerId) -> u64 {
        *self.target.borrow_mut() = Some(target.clone());
        let previous = self.slot.rcu(|cur| Slot {
            generation: cur.generation + 1,
            route: cur.route.clone(),
        });
        previous.generation + 1
    }
}

impl TransportClient for HttpTransport {
    fn connect(&self, server: &Server) {
        let generation = self.bump(&server.id);
        let client = self.client.clone();
        let events = self.events.clone();
        let slot = Arc::clone(&self.slot);
        let id = server.id.clone();
        let session = server.session.clone();

        tokio::spawn(async move {
            match client.route(&session).await {
                Ok(addresses) => {
                    let route = Arc::new(Route {
                        server: id.clone(),
                        session,
                        addresses,
                    });
                    let previous = slot.rcu(|cur| {
                        if cur.generation == generation {
                            Arc::new(Slot {
                                generation,
                                route: Some(Arc::clone(&route)),
                            })
                        } else {
                            Arc::clone(cur)
                        }
                    });
                    if previous.generation != generation {
                        debug!(server = %id, "route resolved for a superseded connect");
                        return;
                    }
                    events.send(Event::ServerConnected(id));
                }
                // Left to the arbiter's connect timeout.
                Err(e) => warn!(server = %id, error = %e, "route lookup failed"),
            }
        });
    }

    fn reuse(&self, server: &Server) {
        self.bump(&server.id);
        debug!(server = %server.id, "reusing route, pending connects discarded");
    }

    fn connect_local(&self) {
        self.mode.set(ConnectionMode::Local);
    }

    fn connect_remote(&self) {
        self.mode.set(ConnectionMode::Remote);
    }

    fn is_connected(&self, server: &Server) -> bool {
        self.route().is_some_and(|r| r.server == server.id)
    }

    fn fetch_shares(&self) {
        let Some(route) = self.route() else {
            warn!("share listing requested without a connected server");
            if let Some(target) = self.target.borrow().clone() {
                self.events.send(Event::SharesLoadFailed(target));
            }
            return;
        };
        let address = self.address_of(&route);
        let client = self.client.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            let server = route.server.clone();
            match client.list_shares(&address, &route.session).await {
                Ok(records) => {
                    debug!(server = %server, count = records.len(), "shares fetched");
                    let shares = records
                        .into_iter()
                        .map(|r| share_from_record(r, &server))
                        .collect();
                    events.send(Event::SharesLoaded { server, shares });
                }
                Err(e) => {
                    warn!(server = %server, error = %e, "share listing failed");
                    events.send(Event::SharesLoadFailed(server));
                }
            }
        });
    }
}
