//! # Transport Layer
//!
//! Owns the network connection and turns it into a stream of framed events
//! in each direction, independent of gameplay semantics.
//!
//! All blocking I/O (accept, dial, recv) lives on spawned tasks; the game's
//! update/draw loop never touches a socket. The host listens and accepts
//! exactly one peer, the guest dials, and both sides then share the same
//! [`Connection`](tcp::Connection) machinery.

pub mod tcp;

pub use tcp::{accept_repeatedly, dial, establish, listen_and_accept, Connection, Listener};
