//! # Session Context
//!
//! Explicitly constructed per-session state: role, dispatcher, readiness
//! flag, and lifecycle. Nothing here is a process-wide static, so several
//! sessions can coexist in one test process.
//!
//! The readiness barrier is the synchronization point between "transport
//! established" and "gameplay begins": game startup awaits
//! [`Session::wait_connected`] before constructing the playfield instead of
//! spinning on a flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::protocol::dispatcher::EventDispatcher;

/// Which side of the session this process plays. Exactly one process in a
/// session is the host. Immutable once the session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Listens for the incoming connection.
    Host,
    /// Dials the host.
    Guest,
}

impl Role {
    pub fn is_host(self) -> bool {
        matches!(self, Role::Host)
    }
}

/// Lifecycle of the connection owned by a session.
///
/// `Closed` is terminal. `Connected` is normally reached once, from
/// `Connecting`; a multi-round host (see
/// [`accept_repeatedly`](crate::transport::tcp::accept_repeatedly)) may
/// re-enter it from `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Connected,
    Disconnected,
    Closed,
}

/// Shared context for one game session.
///
/// Created before the transport starts and handed to every component; the
/// transport drives the state machine, the game observes it.
pub struct Session {
    role: Role,
    dispatcher: EventDispatcher,
    connected: AtomicBool,
    state_tx: watch::Sender<SessionState>,
}

impl Session {
    pub fn new(role: Role) -> Arc<Self> {
        let (state_tx, _) = watch::channel(SessionState::Connecting);
        Arc::new(Self {
            role,
            dispatcher: EventDispatcher::new(),
            connected: AtomicBool::new(false),
            state_tx,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_host(&self) -> bool {
        self.role.is_host()
    }

    /// Registry for this session's subscribers.
    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Latched readiness flag: set when the connection first becomes usable
    /// in both directions, never cleared afterwards — a later disconnect is
    /// reported through [`Session::state`] instead.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Readiness barrier for game startup.
    ///
    /// Resolves once the connection is established. A session that closes
    /// before ever connecting also unblocks, so startup can observe the
    /// failure through [`Session::is_connected`] returning false.
    pub async fn wait_connected(&self) {
        let mut rx = self.state_tx.subscribe();
        let _ = rx
            .wait_for(|s| matches!(s, SessionState::Connected | SessionState::Closed))
            .await;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// Watch the lifecycle; the receiver sees every transition, including
    /// the peer dropping (`Disconnected`).
    pub fn state_changes(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Advance the state machine. Invalid transitions are ignored: `Closed`
    /// is terminal, and `Connected` is only reachable from `Connecting` or
    /// `Disconnected`.
    pub(crate) fn transition(&self, next: SessionState) -> bool {
        let changed = self.state_tx.send_if_modified(|current| {
            let allowed = match (*current, next) {
                (SessionState::Closed, _) => false,
                (state, _) if state == next => false,
                (SessionState::Connecting, SessionState::Connected) => true,
                (SessionState::Disconnected, SessionState::Connected) => true,
                (_, SessionState::Connected) => false,
                (SessionState::Connected, SessionState::Disconnected) => true,
                (_, SessionState::Disconnected) => false,
                (_, SessionState::Closed) => true,
                (_, SessionState::Connecting) => false,
            };
            if allowed {
                *current = next;
            }
            allowed
        });

        if changed {
            match next {
                SessionState::Connected => {
                    self.connected.store(true, Ordering::Release);
                    info!(role = ?self.role, "session connected");
                }
                SessionState::Disconnected => info!(role = ?self.role, "peer disconnected"),
                SessionState::Closed => info!(role = ?self.role, "session closed"),
                SessionState::Connecting => {}
            }
        }
        changed
    }
}
