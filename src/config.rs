//! # Configuration Management
//!
//! Centralized configuration for the NetBall transport core.
//!
//! The session section carries the bootstrap input every instance needs
//! before the transport starts: whether it is the host, the peer address,
//! and the port. It is consumed once at startup and never re-read during
//! the session.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-variable overrides via `from_env()`: `NETBALL_IS_HOST`,
//!   `NETBALL_PEER`, `NETBALL_PORT`, `NETBALL_CONNECT_TIMEOUT_MS`,
//!   `NETBALL_ACCEPT_TIMEOUT_MS`, `NETBALL_ACCEPT_POLICY`

use crate::error::{NetError, Result};
use crate::session::Role;
use crate::utils::timeout;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// Default TCP port for a match.
pub const DEFAULT_PORT: u16 = 9000;

/// Main configuration structure that contains all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct NetConfig {
    /// Session bootstrap: role and peer endpoint
    #[serde(default)]
    pub session: SessionSettings,

    /// Transport timeouts and accept policy
    #[serde(default)]
    pub transport: TransportSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl NetConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| NetError::Config(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| NetError::Config(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| NetError::Config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Start with defaults
        let mut config = Self::default();

        // Override with environment variables
        if let Ok(is_host) = std::env::var("NETBALL_IS_HOST") {
            if let Ok(val) = is_host.parse::<bool>() {
                config.session.is_host = val;
            }
        }

        if let Ok(peer) = std::env::var("NETBALL_PEER") {
            config.session.peer = peer;
        }

        if let Ok(port) = std::env::var("NETBALL_PORT") {
            if let Ok(val) = port.parse::<u16>() {
                config.session.port = val;
            }
        }

        if let Ok(timeout) = std::env::var("NETBALL_CONNECT_TIMEOUT_MS") {
            if let Ok(val) = timeout.parse::<u64>() {
                config.transport.connect_timeout = Some(Duration::from_millis(val));
            }
        }

        if let Ok(timeout) = std::env::var("NETBALL_ACCEPT_TIMEOUT_MS") {
            if let Ok(val) = timeout.parse::<u64>() {
                config.transport.accept_timeout = Some(Duration::from_millis(val));
            }
        }

        if let Ok(policy) = std::env::var("NETBALL_ACCEPT_POLICY") {
            match policy.as_str() {
                "single" => config.transport.accept_policy = AcceptPolicy::Single,
                "repeat" => config.transport.accept_policy = AcceptPolicy::Repeat,
                other => {
                    return Err(NetError::Config(format!(
                        "Invalid NETBALL_ACCEPT_POLICY: '{other}' (expected 'single' or 'repeat')"
                    )))
                }
            }
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        errors.extend(self.session.validate());
        errors.extend(self.transport.validate());
        errors.extend(self.logging.validate());

        // Accept policy only concerns the listening side
        if !self.session.is_host && self.transport.accept_policy == AcceptPolicy::Repeat {
            errors.push("accept_policy = \"repeat\" applies to the host only".to_string());
        }

        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(NetError::Config(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Session bootstrap settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionSettings {
    /// Whether this instance hosts the match (listens) or joins it (dials)
    pub is_host: bool,

    /// Peer IPv4/IPv6 literal: the listen address for the host, the target
    /// address for the guest
    pub peer: String,

    /// TCP port of the match
    pub port: u16,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            is_host: true,
            peer: String::from("127.0.0.1"),
            port: DEFAULT_PORT,
        }
    }
}

impl SessionSettings {
    /// The role this configuration selects.
    pub fn role(&self) -> Role {
        if self.is_host {
            Role::Host
        } else {
            Role::Guest
        }
    }

    /// Resolve the configured endpoint. The peer must be a well-formed
    /// IPv4/IPv6 literal; hostnames are not resolved here.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .peer
            .parse()
            .map_err(|_| NetError::Config(format!("'{}' is not an IP literal", self.peer)))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Validate session settings
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.peer.is_empty() {
            errors.push("Peer address cannot be empty".to_string());
        } else if self.peer.parse::<IpAddr>().is_err() {
            errors.push(format!(
                "Invalid peer address: '{}' (expected an IPv4/IPv6 literal)",
                self.peer
            ));
        }

        // Port 0 asks the OS for an ephemeral port; only the listening side
        // can make use of that.
        if self.port == 0 && !self.is_host {
            errors.push("Guest cannot dial port 0".to_string());
        }

        errors
    }
}

/// How the host treats the listener after its peer drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptPolicy {
    /// One connection for the session's lifetime.
    #[default]
    Single,
    /// Re-enter accept after each disconnect, one round at a time.
    Repeat,
}

/// Transport settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportSettings {
    /// Timeout for the guest's dial; `None` waits indefinitely
    #[serde(default, with = "opt_duration_serde")]
    pub connect_timeout: Option<Duration>,

    /// Timeout for the host's accept; `None` (the default) blocks until a
    /// peer arrives
    #[serde(default, with = "opt_duration_serde")]
    pub accept_timeout: Option<Duration>,

    /// Accept policy for the host
    #[serde(default)]
    pub accept_policy: AcceptPolicy,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Some(timeout::DEFAULT_CONNECT_TIMEOUT),
            accept_timeout: None,
            accept_policy: AcceptPolicy::Single,
        }
    }
}

impl TransportSettings {
    /// Validate transport settings
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(limit) = self.connect_timeout {
            if limit < timeout::MIN_TIMEOUT {
                errors.push("Connect timeout too short (minimum: 100ms)".to_string());
            }
        }

        if let Some(limit) = self.accept_timeout {
            if limit < timeout::MIN_TIMEOUT {
                errors.push("Accept timeout too short (minimum: 100ms)".to_string());
            }
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("netball-net"),
            log_level: Level::INFO,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for Option<Duration> serialization as milliseconds
mod opt_duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration
            .map(|d| d.as_millis() as u64)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
