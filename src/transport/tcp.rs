//! # TCP Transport
//!
//! Exactly one stream connection per session: the host binds, listens, and
//! accepts; the guest dials. Either way the socket ends up wrapped in the
//! event codec, with a receive loop on its own task feeding the session's
//! dispatcher and a serialized write path shared by all senders.
//!
//! ## Responsibilities
//! - Establish the connection, with configurable accept/dial timeouts
//! - Run the per-connection receive loop without blocking the game loop
//! - Serialize concurrent sends so frames never interleave on the wire
//! - Surface peer disconnects through the session state machine
//! - Orderly, idempotent shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{NetConfig, TransportSettings};
use crate::core::codec::EventCodec;
use crate::core::event::Event;
use crate::error::{NetError, Result};
use crate::session::{Session, SessionState};

type EventSink = SplitSink<Framed<TcpStream, EventCodec>, Event>;

/// Handle to the established connection of a session.
///
/// Cheap to clone; every clone shares the write path and the shutdown
/// signal. Dropping the last clone stops the receive loop.
#[derive(Clone)]
pub struct Connection {
    session: Arc<Session>,
    peer_addr: SocketAddr,
    writer: Arc<Mutex<EventSink>>,
    shutdown_tx: mpsc::Sender<()>,
    closed_rx: watch::Receiver<bool>,
}

impl Connection {
    /// Wrap an established stream: mark the session connected and start the
    /// receive loop on its own task.
    fn spawn(session: Arc<Session>, stream: TcpStream) -> Result<Self> {
        let peer_addr = match stream.peer_addr() {
            Ok(addr) => addr,
            Err(e) => {
                session.transition(SessionState::Closed);
                return Err(e.into());
            }
        };
        let (sink, mut frames) = Framed::new(stream, EventCodec).split();
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let (closed_tx, closed_rx) = watch::channel(false);

        session.transition(SessionState::Connected);

        let loop_session = session.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    // Close requested, or every handle dropped.
                    _ = shutdown_rx.recv() => {
                        debug!(peer = %peer_addr, "receive loop stopping on shutdown signal");
                        loop_session.transition(SessionState::Closed);
                        break;
                    }
                    frame = frames.next() => match frame {
                        Some(Ok(event)) => {
                            debug!(peer = %peer_addr, kind = event.kind().name(), "event received");
                            if let Err(e) = loop_session.dispatcher().dispatch(&event) {
                                error!(peer = %peer_addr, error = %e, "dispatch failed");
                            }
                        }
                        Some(Err(e)) => {
                            // Malformed or oversized frame: the stream is no
                            // longer trustworthy, close instead of guessing.
                            warn!(peer = %peer_addr, error = %e, "closing connection on receive error");
                            loop_session.transition(SessionState::Disconnected);
                            break;
                        }
                        None => {
                            info!(peer = %peer_addr, "peer closed the connection");
                            loop_session.transition(SessionState::Disconnected);
                            break;
                        }
                    }
                }
            }
            let _ = closed_tx.send(true);
        });

        Ok(Self {
            session,
            peer_addr,
            writer: Arc::new(Mutex::new(sink)),
            shutdown_tx,
            closed_rx,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Send one event. The whole frame is written and flushed before this
    /// returns; concurrent senders are serialized, so two frames never
    /// interleave on the wire. No automatic retry on failure.
    pub async fn send(&self, event: Event) -> Result<()> {
        if *self.closed_rx.borrow() {
            return Err(match self.session.state() {
                SessionState::Disconnected => NetError::PeerDisconnected,
                _ => NetError::ConnectionClosed,
            });
        }

        let mut writer = self.writer.lock().await;
        writer
            .send(event)
            .await
            .map_err(|e| NetError::Send(e.to_string()))
    }

    /// Resolves once the receive loop has stopped, whether through a peer
    /// disconnect, a receive error, or [`Connection::close`].
    pub async fn closed(&self) {
        let mut rx = self.closed_rx.clone();
        let _ = rx.wait_for(|done| *done).await;
    }

    /// Orderly bidirectional shutdown; the session moves to `Closed`.
    /// Idempotent — closing twice is not an error.
    pub async fn close(&self) -> Result<()> {
        self.close_socket().await;
        self.session.transition(SessionState::Closed);
        Ok(())
    }

    /// Stop the receive loop and release the socket without closing the
    /// session, so a multi-round host can accept the next peer.
    async fn close_socket(&self) {
        // A second close finds the loop gone; both sends below are no-ops then.
        let _ = self.shutdown_tx.send(()).await;
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.close().await {
            debug!(peer = %self.peer_addr, error = %e, "socket already closed");
        }
    }
}

/// Bound host-side listener.
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind a listening socket. Bind/listen failures are setup errors:
    /// the session cannot proceed.
    #[instrument]
    pub async fn bind(addr: &str) -> Result<Self> {
        let inner = TcpListener::bind(addr)
            .await
            .map_err(|e| NetError::Setup(format!("failed to bind {addr}: {e}")))?;
        let local_addr = inner
            .local_addr()
            .map_err(|e| NetError::Setup(e.to_string()))?;
        info!(address = %local_addr, "listening");
        Ok(Self { inner, local_addr })
    }

    /// The bound address, with the ephemeral port resolved.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait until exactly one peer connects, then start its receive loop.
    /// With no `accept_timeout` this waits indefinitely.
    ///
    /// A setup failure closes the session, so anything awaiting the
    /// readiness barrier unblocks instead of hanging.
    pub async fn accept_one(
        &self,
        session: &Arc<Session>,
        accept_timeout: Option<Duration>,
    ) -> Result<Connection> {
        let accept = self.inner.accept();
        let accepted = match accept_timeout {
            Some(limit) => match timeout(limit, accept).await {
                Ok(res) => res.map_err(|e| NetError::Setup(format!("accept failed: {e}"))),
                Err(_) => Err(NetError::Setup(format!(
                    "no peer connected within {limit:?}"
                ))),
            },
            None => accept
                .await
                .map_err(|e| NetError::Setup(format!("accept failed: {e}"))),
        };

        let (stream, peer) = match accepted {
            Ok(pair) => pair,
            Err(e) => {
                session.transition(SessionState::Closed);
                return Err(e);
            }
        };

        info!(peer = %peer, "peer connected");
        Connection::spawn(session.clone(), stream)
    }
}

/// Host entry: bind, listen with a bounded backlog, and block until the
/// single peer connects. A bind or accept failure closes the session.
#[instrument(skip(session, settings))]
pub async fn listen_and_accept(
    session: &Arc<Session>,
    addr: &str,
    settings: &TransportSettings,
) -> Result<Connection> {
    let listener = match Listener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            session.transition(SessionState::Closed);
            return Err(e);
        }
    };
    listener.accept_one(session, settings.accept_timeout).await
}

/// Guest entry: dial the host. The core never retries internally; callers
/// own their backoff policy. A failed dial closes the session, so anything
/// awaiting the readiness barrier unblocks instead of hanging.
#[instrument(skip(session, settings))]
pub async fn dial(
    session: &Arc<Session>,
    addr: &str,
    settings: &TransportSettings,
) -> Result<Connection> {
    let connect = TcpStream::connect(addr);
    let connected = match settings.connect_timeout {
        Some(limit) => match timeout(limit, connect).await {
            Ok(res) => {
                res.map_err(|e| NetError::Connect(format!("failed to connect to {addr}: {e}")))
            }
            Err(_) => Err(NetError::Connect(format!(
                "connect to {addr} timed out after {limit:?}"
            ))),
        },
        None => connect
            .await
            .map_err(|e| NetError::Connect(format!("failed to connect to {addr}: {e}"))),
    };

    let stream = match connected {
        Ok(stream) => stream,
        Err(e) => {
            session.transition(SessionState::Closed);
            return Err(e);
        }
    };

    info!(peer = %addr, "connected to host");
    Connection::spawn(session.clone(), stream)
}

/// One-call session bootstrap for the default single-session policy:
/// listen-and-accept as host, dial as guest. Multi-round hosts bind a
/// [`Listener`] and drive [`accept_repeatedly`] themselves.
pub async fn establish(session: &Arc<Session>, config: &NetConfig) -> Result<Connection> {
    let addr = match config.session.socket_addr() {
        Ok(addr) => addr.to_string(),
        Err(e) => {
            session.transition(SessionState::Closed);
            return Err(e);
        }
    };
    if session.is_host() {
        listen_and_accept(session, &addr, &config.transport).await
    } else {
        dial(session, &addr, &config.transport).await
    }
}

/// Multi-round host accept ([`AcceptPolicy::Repeat`]): treat each peer as
/// an independent round. The previous connection is fully closed before
/// re-entering accept, and `on_connect` hands each new handle to the scene.
///
/// [`AcceptPolicy::Repeat`]: crate::config::AcceptPolicy::Repeat
pub async fn accept_repeatedly<F>(
    listener: Listener,
    session: Arc<Session>,
    settings: &TransportSettings,
    mut on_connect: F,
) -> Result<()>
where
    F: FnMut(Connection) + Send,
{
    loop {
        let conn = listener.accept_one(&session, settings.accept_timeout).await?;
        on_connect(conn.clone());

        conn.closed().await;
        conn.close_socket().await;
        info!("round over, re-entering accept");
    }
}
