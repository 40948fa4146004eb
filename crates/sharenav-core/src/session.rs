// ── Session runtime ──
//
// Owns the dispatch loop: pulls one queued event at a time and publishes
// it on the bus, so every handler finishes before the next event starts.
// Also surfaces the controller's terminal outcomes to the caller.

use std::rc::Rc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::bus::{EventBus, EventQueue};
use crate::config::SessionConfig;
use crate::controller::{Collaborators, SessionController};
use crate::error::SessionError;

/// Why `run` returned normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user aborted sign-in; the hosting context should close.
    Closed,
    /// The cancellation token fired.
    Cancelled,
}

/// Result of a single dispatch step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// An event was dispatched; keep going.
    Dispatched,
    /// The session reached an end state.
    Finished(SessionEnd),
}

pub struct Session {
    bus: Rc<EventBus>,
    queue: EventQueue,
    controller: SessionController,
    cancel: CancellationToken,
}

impl Session {
    pub fn new(
        config: &SessionConfig,
        bus: Rc<EventBus>,
        queue: EventQueue,
        collaborators: Collaborators,
    ) -> Self {
        let controller = SessionController::new(config, Rc::clone(&bus), collaborators);
        Self {
            bus,
            queue,
            controller,
            cancel: CancellationToken::new(),
        }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    /// Token that stops `run` / `step` from the outside.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Attach the controller and begin authentication.
    pub fn start(&self) {
        self.controller.activate();
        self.controller.start();
    }

    /// Wait for and dispatch one event, then report whether the session ended.
    pub async fn step(&mut self) -> Result<Step, SessionError> {
        if let Some(end) = self.check_outcome()? {
            return Ok(Step::Finished(end));
        }

        let event = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                self.controller.deactivate();
                return Ok(Step::Finished(SessionEnd::Cancelled));
            }
            event = self.queue.recv() => event,
        };

        let Some(event) = event else {
            self.controller.deactivate();
            return Err(SessionError::ChannelClosed);
        };

        debug!(event = event.kind(), "dispatching");
        self.bus.publish(&event);

        match self.check_outcome()? {
            Some(end) => Ok(Step::Finished(end)),
            None => Ok(Step::Dispatched),
        }
    }

    /// Start the session and dispatch until it ends.
    pub async fn run(mut self) -> Result<SessionEnd, SessionError> {
        self.start();
        loop {
            if let Step::Finished(end) = self.step().await? {
                info!(?end, "session finished");
                return Ok(end);
            }
        }
    }

    fn check_outcome(&self) -> Result<Option<SessionEnd>, SessionError> {
        if let Some(fault) = self.controller.take_fault() {
            self.controller.deactivate();
            return Err(SessionError::Credential(fault));
        }
        if self.controller.is_terminated() {
            self.controller.deactivate();
            return Ok(Some(SessionEnd::Closed));
        }
        Ok(None)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Breaks the bus <-> controller reference cycle.
        self.controller.deactivate();
    }
}
