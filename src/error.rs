//! # Error Types
//!
//! Error handling for the NetBall transport core.
//!
//! This module defines all error variants that can occur between reading a
//! configuration file and tearing a session down, from socket-level failures
//! to malformed frames on the wire.
//!
//! ## Error Categories
//! - **Setup/Connect Errors**: bind, listen, or dial failed — fatal to session start
//! - **Frame Errors**: unrecognized tags, oversized length claims
//! - **Connection Errors**: send failures, peer disconnects
//! - **Configuration Errors**: invalid addresses, out-of-range timeouts
//!
//! [`NetError::TruncatedFrame`] is not a failure: it is the buffering signal
//! the decoder emits when a frame's declared length exceeds the bytes
//! available, telling the caller to wait for more data.

use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
/// Static strings are borrowed, avoiding heap allocations for common error cases.
pub mod constants {
    /// Dispatcher-related error messages
    pub const ERR_DISPATCHER_WRITE_LOCK: &str = "Failed to acquire write lock on dispatcher";
    pub const ERR_DISPATCHER_READ_LOCK: &str = "Failed to acquire read lock on dispatcher";
}

// NetError is the primary error type for all transport and dispatch operations
#[derive(Error, Debug)]
pub enum NetError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Transport setup failed: {0}")]
    Setup(String),

    #[error("Connect failed: {0}")]
    Connect(String),

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("Truncated frame: need {needed} bytes, have {available}")]
    TruncatedFrame { needed: usize, available: usize },

    #[error("Frame too large: {0} bytes")]
    OversizedFrame(usize),

    #[error("Peer disconnected")]
    PeerDisconnected,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Custom error: {0}")]
    Custom(String),
}

/// Type alias for Results using NetError
pub type Result<T> = std::result::Result<T, NetError>;
