//! Default deadlines for transport operations.

use std::time::Duration;

/// Default guest dial timeout. Five seconds is long enough for any LAN or
/// WAN handshake that is going to succeed.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Shortest timeout the configuration accepts.
pub const MIN_TIMEOUT: Duration = Duration::from_millis(100);
