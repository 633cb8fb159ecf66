//! `BlackjackServer` builder and server loop.
//!
//! This is the entry point for running a Blackjack table. It ties the
//! layers together: transport → protocol → game, with one
//! [`run_session`] task per accepted connection and an optional
//! discovery task advertising the table over UDP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use blackjack_game::ShuffledDecks;
use blackjack_protocol::Offer;
use blackjack_transport::{Connection, TcpConnection, TcpTransport, Transport};

use crate::config::{DiscoveryConfig, ServerConfig, SessionConfig};
use crate::discovery::{bind_broadcast_socket, broadcast_offers};
use crate::session::run_session;
use crate::BlackjackError;

/// Builder for configuring and starting a Blackjack server.
///
/// # Example
///
/// ```rust,no_run
/// use blackjack::prelude::*;
///
/// # async fn start() -> Result<(), BlackjackError> {
/// let server = BlackjackServer::builder()
///     .bind("0.0.0.0:0")
///     .server_name("table-1")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct BlackjackServerBuilder {
    config: ServerConfig,
}

impl BlackjackServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::from_config(ServerConfig::default())
    }

    /// Starts from an existing configuration, e.g. one read from the
    /// environment.
    pub fn from_config(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Sets the TCP address to bind to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the name advertised in offers.
    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.config.server_name = name.into();
        self
    }

    /// Sets the per-connection settings.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.config.session = config;
        self
    }

    /// Fixes the shuffle seed so every run deals the same cards.
    pub fn deck_seed(mut self, seed: u64) -> Self {
        self.config.deck_seed = Some(seed);
        self
    }

    /// Sets the discovery settings.
    pub fn discovery(mut self, config: DiscoveryConfig) -> Self {
        self.config.discovery = config;
        self
    }

    /// Binds the listening socket.
    pub async fn build(self) -> Result<BlackjackServer, BlackjackError> {
        let transport = TcpTransport::bind(&self.config.bind_addr).await?;
        Ok(BlackjackServer {
            transport,
            config: Arc::new(self.config),
        })
    }
}

impl Default for BlackjackServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Blackjack server.
///
/// Call [`run()`](Self::run) to start accepting players.
pub struct BlackjackServer {
    transport: TcpTransport,
    config: Arc<ServerConfig>,
}

impl BlackjackServer {
    /// Creates a new builder.
    pub fn builder() -> BlackjackServerBuilder {
        BlackjackServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Runs the server until the process is terminated.
    ///
    /// Starts the offer broadcast if discovery is enabled, then accepts
    /// connections forever. A failed accept is logged and skipped.
    pub async fn run(mut self) -> Result<(), BlackjackError> {
        let local_addr = self.local_addr()?;
        tracing::info!(
            %local_addr,
            name = %self.config.server_name,
            "Blackjack server running"
        );

        let _broadcast = if self.config.discovery.enabled {
            Some(self.start_discovery(local_addr.port()).await?)
        } else {
            None
        };

        loop {
            match self.transport.accept().await {
                Ok(conn) => self.spawn_session(conn),
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }

    async fn start_discovery(
        &self,
        tcp_port: u16,
    ) -> Result<AbortOnDrop, BlackjackError> {
        let socket = bind_broadcast_socket().await?;
        let offer = Offer {
            tcp_port,
            server_name: self.config.server_name.clone(),
        };
        let discovery = &self.config.discovery;
        let handle = tokio::spawn(broadcast_offers(
            socket,
            offer,
            discovery.target(),
            discovery.interval,
        ));
        Ok(AbortOnDrop(handle))
    }

    fn spawn_session(&self, conn: TcpConnection) {
        let config = Arc::clone(&self.config);
        tokio::spawn(async move {
            let mut decks = match config.deck_seed {
                Some(seed) => ShuffledDecks::from_seed(
                    seed.wrapping_add(conn.id().get()),
                ),
                None => ShuffledDecks::from_os_rng(),
            };
            // Outcome already logged by `run_session`.
            let _ = run_session(conn, &config.session, &mut decks).await;
        });
    }
}

/// Stops a background task when the owner goes away.
struct AbortOnDrop(tokio::task::JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// A server config that never broadcasts and binds loopback on an
/// ephemeral port. Used by the integration tests.
#[doc(hidden)]
pub fn local_config(idle_timeout: Duration) -> ServerConfig {
    ServerConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        session: SessionConfig { idle_timeout },
        discovery: DiscoveryConfig {
            enabled: false,
            ..DiscoveryConfig::default()
        },
        ..ServerConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_config() {
        let builder = BlackjackServer::builder()
            .bind("127.0.0.1:5000")
            .server_name("table-9")
            .deck_seed(7);
        assert_eq!(builder.config.bind_addr, "127.0.0.1:5000");
        assert_eq!(builder.config.server_name, "table-9");
        assert_eq!(builder.config.deck_seed, Some(7));
    }

    #[test]
    fn test_local_config_disables_discovery() {
        let config = local_config(Duration::from_secs(2));
        assert!(!config.discovery.enabled);
        assert_eq!(config.bind_addr, "127.0.0.1:0");
        assert_eq!(config.session.idle_timeout, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_build_binds_ephemeral_port() {
        let server = BlackjackServerBuilder::from_config(local_config(
            Duration::from_secs(1),
        ))
        .build()
        .await
        .unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
        assert_eq!(server.config().server_name, "BlackijeckyServer");
    }
}
