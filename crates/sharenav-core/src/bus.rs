// ── Event channel ──
//
// Process-wide publish/subscribe bus. Asynchronous producers enqueue
// through a cloneable `EventSender`; the dispatch task drains the
// `EventQueue` one event at a time and publishes each synchronously to
// every handler subscribed at publish time.

use std::cell::RefCell;
use std::rc::Rc;

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::event::Event;

/// Receives published events. Runs on the dispatch task, to completion.
pub trait EventHandler {
    fn on_event(&self, event: &Event);
}

/// Synchronous fan-out to registered handlers.
///
/// Not `Send`: the bus and its handlers live on the single dispatch task.
pub struct EventBus {
    subscribers: RefCell<Vec<Rc<dyn EventHandler>>>,
    sender: EventSender,
}

impl EventBus {
    /// Create a bus and the queue its senders feed.
    pub fn new() -> (Self, EventQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        let bus = Self {
            subscribers: RefCell::new(Vec::new()),
            sender: EventSender { tx },
        };
        (bus, EventQueue { rx })
    }

    /// A handle for producers on any task or thread.
    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// Register `handler`. Returns `false` if it was already registered.
    pub fn subscribe(&self, handler: Rc<dyn EventHandler>) -> bool {
        let mut subs = self.subscribers.borrow_mut();
        if subs.iter().any(|h| Rc::ptr_eq(h, &handler)) {
            return false;
        }
        subs.push(handler);
        debug!(subscribers = subs.len(), "handler subscribed");
        true
    }

    /// Remove `handler`. Returns `false` if it was not registered.
    ///
    /// Safe to call from inside `on_event`; the dispatch in progress still
    /// completes against the handlers registered when it started.
    pub fn unsubscribe(&self, handler: &Rc<dyn EventHandler>) -> bool {
        let mut subs = self.subscribers.borrow_mut();
        let before = subs.len();
        subs.retain(|h| !Rc::ptr_eq(h, handler));
        let removed = subs.len() != before;
        if removed {
            debug!(subscribers = subs.len(), "handler unsubscribed");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Deliver `event` to every handler registered right now, in
    /// registration order, before returning.
    pub fn publish(&self, event: &Event) {
        let snapshot: Vec<Rc<dyn EventHandler>> = self.subscribers.borrow().clone();
        trace!(event = event.kind(), subscribers = snapshot.len(), "publish");
        for handler in snapshot {
            handler.on_event(event);
        }
    }
}

/// Cloneable, `Send` producer handle onto the bus queue.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventSender {
    /// Enqueue `event` for dispatch. Dropped silently once the session ended.
    pub fn send(&self, event: Event) {
        let kind = event.kind();
        if self.tx.send(event).is_err() {
            debug!(event = kind, "event dropped: session no longer dispatching");
        }
    }
}

/// Receiving end of the bus queue, owned by the dispatch loop.
pub struct EventQueue {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventQueue {
    /// Wait for the next queued event. `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Take an already-queued event without waiting.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }
}
