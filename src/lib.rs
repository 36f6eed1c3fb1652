//! # netball-net
//!
//! Peer-to-peer transport and event-dispatch core for the NetBall game.
//!
//! Two independently started game instances — a host and a guest — stay in
//! agreement about shared world state (ball position, scoring) over a
//! single TCP connection. This crate is the part that makes that work:
//! role selection, connection establishment, length-delimited framing of
//! typed events, and redelivery to local subscribers, all without ever
//! blocking the game's update/render loop.
//!
//! ## Layers
//! - [`core`]: event types and the wire codec
//! - [`transport`]: listener/dialer, receive loop, serialized send path
//! - [`protocol`]: the subscriber dispatcher
//! - [`session`]: per-session context, readiness barrier, lifecycle
//! - [`config`]: bootstrap input and timeouts, loaded once at startup
//!
//! ## Example
//! ```no_run
//! use netball_net::prelude::*;
//!
//! # async fn run() -> netball_net::error::Result<()> {
//! let config = NetConfig::from_file("netball.toml")?;
//! config.validate_strict()?;
//!
//! let session = Session::new(config.session.role());
//! session.dispatcher().register(EventKind::Goal, |_| {
//!     // celebrate
//! })?;
//!
//! let conn = netball_net::transport::establish(&session, &config).await?;
//! session.wait_connected().await;
//!
//! conn.send(Event::BallSetup { x: 100.0, y: 50.0 }).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod utils;

/// Commonly used types, re-exported for convenience.
pub mod prelude {
    pub use crate::config::{AcceptPolicy, NetConfig, TransportSettings};
    pub use crate::core::codec::EventCodec;
    pub use crate::core::event::{Event, EventKind};
    pub use crate::error::{NetError, Result};
    pub use crate::protocol::dispatcher::EventDispatcher;
    pub use crate::session::{Role, Session, SessionState};
    pub use crate::transport::tcp::{dial, establish, listen_and_accept, Connection, Listener};
}
