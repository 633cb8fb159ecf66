//! Server and client configuration.
//!
//! Every struct has a `Default` that matches the reference deployment, so
//! callers override only the fields they care about. `from_env` layers
//! `BLACKJACK_*` environment variables on top of those defaults.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use blackjack_protocol::constants::DISCOVERY_PORT;
use serde::{Deserialize, Serialize};

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set but its value could not be parsed.
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Per-connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long a single receive may wait before the session is dropped.
    ///
    /// Default: 60 seconds.
    pub idle_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(60),
        }
    }
}

// ---------------------------------------------------------------------------
// DiscoveryConfig
// ---------------------------------------------------------------------------

/// Where and how often the server advertises itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Whether the server broadcasts offers at all.
    pub enabled: bool,
    /// Destination address of the offer datagrams.
    pub broadcast_ip: IpAddr,
    /// UDP port offers are sent to and clients listen on.
    pub port: u16,
    /// Time between two offers.
    pub interval: Duration,
}

impl DiscoveryConfig {
    /// The full destination of offer datagrams.
    pub fn target(&self) -> SocketAddr {
        SocketAddr::new(self.broadcast_ip, self.port)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            broadcast_ip: IpAddr::V4(Ipv4Addr::BROADCAST),
            port: DISCOVERY_PORT,
            interval: Duration::from_secs(1),
        }
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// Everything the server needs to start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// TCP bind address. Port 0 lets the OS pick one; the offer carries
    /// whatever port was assigned.
    pub bind_addr: String,
    /// Name advertised in offers.
    pub server_name: String,
    pub session: SessionConfig,
    pub discovery: DiscoveryConfig,
    /// Fixed shuffle seed. `None` shuffles from OS entropy.
    pub deck_seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:0".to_string(),
            server_name: "BlackijeckyServer".to_string(),
            session: SessionConfig::default(),
            discovery: DiscoveryConfig::default(),
            deck_seed: None,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if a variable is set to a value
    /// that does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(bind) = lookup("BLACKJACK_BIND") {
            config.bind_addr = bind;
        }
        if let Some(name) = lookup("BLACKJACK_SERVER_NAME") {
            config.server_name = name;
        }
        if let Some(secs) = parse(&lookup, "BLACKJACK_IDLE_TIMEOUT_SECS")? {
            config.session.idle_timeout = Duration::from_secs(secs);
        }
        if let Some(enabled) = parse(&lookup, "BLACKJACK_DISCOVERY_ENABLED")? {
            config.discovery.enabled = enabled;
        }
        if let Some(ip) = parse(&lookup, "BLACKJACK_BROADCAST_ADDR")? {
            config.discovery.broadcast_ip = ip;
        }
        if let Some(port) = parse(&lookup, "BLACKJACK_DISCOVERY_PORT")? {
            config.discovery.port = port;
        }
        config.deck_seed = parse(&lookup, "BLACKJACK_DECK_SEED")?;

        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Everything the client needs to find a server and play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Name sent in the request.
    pub client_name: String,
    /// UDP port to listen on for offers.
    pub discovery_port: u16,
    pub session: SessionConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_name: "BlackijeckyClient".to_string(),
            discovery_port: DISCOVERY_PORT,
            session: SessionConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(name) = lookup("BLACKJACK_CLIENT_NAME") {
            config.client_name = name;
        }
        if let Some(port) = parse(&lookup, "BLACKJACK_DISCOVERY_PORT")? {
            config.discovery_port = port;
        }
        if let Some(secs) = parse(&lookup, "BLACKJACK_IDLE_TIMEOUT_SECS")? {
            config.session.idle_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

/// Looks up `key` and parses it, if set.
fn parse<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => Err(ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            }),
        },
    }
}
