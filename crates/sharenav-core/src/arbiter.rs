// ── Connection arbiter ──
//
// Owns the single connection target and decides whether a connect is
// needed at all. A connect to the server already reached completes
// synchronously; anything else goes through the transport and is bounded
// by an optional timeout that reports back on the event channel.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::bus::EventSender;
use crate::collaborator::TransportClient;
use crate::event::Event;
use crate::model::{ConnectionMode, ConnectionState, ConnectionStatus, Server, ServerId};

/// What `connect` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Already connected to the target; no transport call was made.
    AlreadyConnected,
    /// A transport connect was issued; wait for `ServerConnected`.
    Pending { attempt: u64 },
}

pub struct ConnectionArbiter {
    transport: Rc<dyn TransportClient>,
    events: EventSender,
    connect_timeout: Option<Duration>,
    state: RefCell<ConnectionState>,
    attempts: Cell<u64>,
    timer: RefCell<Option<JoinHandle<()>>>,
}

impl ConnectionArbiter {
    pub fn new(
        transport: Rc<dyn TransportClient>,
        events: EventSender,
        mode: ConnectionMode,
        connect_timeout: Option<Duration>,
    ) -> Self {
        Self {
            transport,
            events,
            connect_timeout,
            state: RefCell::new(ConnectionState::new(mode)),
            attempts: Cell::new(0),
            timer: RefCell::new(None),
        }
    }

    /// Snapshot of the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    pub fn mode(&self) -> ConnectionMode {
        self.state.borrow().mode
    }

    /// Pure query; never touches the network.
    pub fn is_connected(&self, server: &Server) -> bool {
        self.transport.is_connected(server)
    }

    /// Whether a connect for `server` is still outstanding.
    pub fn is_connecting(&self, server: &ServerId) -> bool {
        let state = self.state.borrow();
        state.targets(server) && matches!(state.status, ConnectionStatus::Connecting { .. })
    }

    /// Whether `server` is the target and its connect has completed.
    pub fn is_established(&self, server: &ServerId) -> bool {
        let state = self.state.borrow();
        state.targets(server) && state.status == ConnectionStatus::Connected
    }

    /// Make `server` the target, connecting only if the transport is not
    /// already connected to it. The previous target is superseded without
    /// an explicit disconnect.
    pub fn connect(&self, server: &Server) -> ConnectOutcome {
        self.cancel_timer();

        if self.transport.is_connected(server) {
            let mut state = self.state.borrow_mut();
            state.target = Some(server.clone());
            state.status = ConnectionStatus::Connected;
            drop(state);
            self.transport.reuse(server);
            debug!(server = %server.id, "already connected, skipping connect");
            return ConnectOutcome::AlreadyConnected;
        }

        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);
        {
            let mut state = self.state.borrow_mut();
            state.target = Some(server.clone());
            state.status = ConnectionStatus::Connecting { attempt };
        }

        info!(server = %server.id, attempt, "connecting");
        self.transport.connect(server);
        self.arm_timer(server.id.clone(), attempt);
        ConnectOutcome::Pending { attempt }
    }

    /// Record `ServerConnected`. Returns `false` for stale or duplicate
    /// completions (not the current target, or not waiting for one).
    pub fn mark_connected(&self, server: &ServerId) -> bool {
        let mut state = self.state.borrow_mut();
        if !state.targets(server) || !matches!(state.status, ConnectionStatus::Connecting { .. }) {
            debug!(server = %server, "ignoring stale connect completion");
            return false;
        }
        state.status = ConnectionStatus::Connected;
        drop(state);
        self.cancel_timer();
        true
    }

    /// Record a connect timeout. Returns `false` if that attempt is no
    /// longer the outstanding one.
    pub fn expire(&self, server: &ServerId, attempt: u64) -> bool {
        let mut state = self.state.borrow_mut();
        let current = state.targets(server)
            && state.status == ConnectionStatus::Connecting { attempt };
        if current {
            state.status = ConnectionStatus::Idle;
        }
        current
    }

    /// Change the transport path used for the current and future targets.
    pub fn select_mode(&self, mode: ConnectionMode) {
        self.state.borrow_mut().mode = mode;
    }

    /// Point the transport at the selected path of the connected target.
    pub fn apply_mode(&self) {
        match self.mode() {
            ConnectionMode::Local => self.transport.connect_local(),
            ConnectionMode::Remote => self.transport.connect_remote(),
        }
    }

    fn arm_timer(&self, server: ServerId, attempt: u64) {
        let Some(timeout) = self.connect_timeout else {
            return;
        };
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            events.send(Event::ServerConnectTimedOut { server, attempt });
        });
        *self.timer.borrow_mut() = Some(handle);
    }

    fn cancel_timer(&self) {
        if let Some(handle) = self.timer.borrow_mut().take() {
            handle.abort();
        }
    }
}

impl Drop for ConnectionArbiter {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::bus::EventBus;

    #[derive(Default)]
    struct StubTransport {
        connected: RefCell<Option<ServerId>>,
        calls: RefCell<Vec<String>>,
    }

    impl TransportClient for StubTransport {
        fn connect(&self, server: &Server) {
            self.calls.borrow_mut().push(format!("connect:{}", server.id));
        }
        fn reuse(&self, server: &Server) {
            self.calls.borrow_mut().push(format!("reuse:{}", server.id));
        }
        fn connect_local(&self) {
            self.calls.borrow_mut().push("local".into());
        }
        fn connect_remote(&self) {
            self.calls.borrow_mut().push("remote".into());
        }
        fn is_connected(&self, server: &Server) -> bool {
            self.connected.borrow().as_ref() == Some(&server.id)
        }
        fn fetch_shares(&self) {
            self.calls.borrow_mut().push("shares".into());
        }
    }

    fn arbiter(transport: &Rc<StubTransport>) -> ConnectionArbiter {
        let (bus, _queue) = EventBus::new();
        ConnectionArbiter::new(transport.clone(), bus.sender(), ConnectionMode::Local, None)
    }

    #[test]
    fn already_connected_skips_transport() {
        let transport = Rc::new(StubTransport::default());
        *transport.connected.borrow_mut() = Some("1".into());
        let arbiter = arbiter(&transport);

        let outcome = arbiter.connect(&Server::new("1", "home", true));

        assert_eq!(outcome, ConnectOutcome::AlreadyConnected);
        assert_eq!(*transport.calls.borrow(), vec!["reuse:1"]);
        assert!(arbiter.is_established(&"1".into()));
    }

    #[test]
    fn new_target_supersedes_previous() {
        let transport = Rc::new(StubTransport::default());
        let arbiter = arbiter(&transport);

        arbiter.connect(&Server::new("1", "home", true));
        let second = arbiter.connect(&Server::new("2", "cabin", true));

        assert_eq!(second, ConnectOutcome::Pending { attempt: 2 });
        assert!(!arbiter.is_established(&"2".into()));
        assert!(!arbiter.mark_connected(&"1".into()));
        assert!(arbiter.mark_connected(&"2".into()));
        assert!(arbiter.is_established(&"2".into()));
        assert!(!arbiter.mark_connected(&"2".into()), "duplicate completion");
        assert_eq!(*transport.calls.borrow(), vec!["connect:1", "connect:2"]);
    }

    #[test]
    fn switching_back_to_connected_server_discards_pending_connect() {
        let transport = Rc::new(StubTransport::default());
        *transport.connected.borrow_mut() = Some("1".into());
        let arbiter = arbiter(&transport);

        arbiter.connect(&Server::new("2", "cabin", true));
        let back = arbiter.connect(&Server::new("1", "home", true));

        assert_eq!(back, ConnectOutcome::AlreadyConnected);
        assert_eq!(*transport.calls.borrow(), vec!["connect:2", "reuse:1"]);
        assert!(!arbiter.mark_connected(&"2".into()));
        assert!(arbiter.is_established(&"1".into()));
    }

    #[test]
    fn expire_only_matches_outstanding_attempt() {
        let transport = Rc::new(StubTransport::default());
        let arbiter = arbiter(&transport);

        arbiter.connect(&Server::new("1", "home", true));
        arbiter.connect(&Server::new("1", "home", true));

        assert!(!arbiter.expire(&"1".into(), 1));
        assert!(arbiter.is_connecting(&"1".into()));
        assert!(arbiter.expire(&"1".into(), 2));
        assert!(!arbiter.is_connecting(&"1".into()));
    }

    #[test]
    fn apply_mode_follows_selection() {
        let transport = Rc::new(StubTransport::default());
        let arbiter = arbiter(&transport);

        arbiter.apply_mode();
        arbiter.select_mode(ConnectionMode::Remote);
        arbiter.apply_mode();

        assert_eq!(*transport.calls.borrow(), vec!["local", "remote"]);
    }
}
