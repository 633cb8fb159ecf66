//! # Blackjack
//!
//! A networked Blackjack table over a fixed-layout binary protocol.
//!
//! The server advertises itself on UDP, accepts TCP connections and
//! plays each one as an isolated session of single-player rounds against
//! the dealer. The client side finds a server, sends a request and plays
//! the rounds with a pluggable [`Strategy`](client::Strategy).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use blackjack::prelude::*;
//!
//! # async fn start() -> Result<(), BlackjackError> {
//! let config = ServerConfig::from_env()?;
//! let server = BlackjackServerBuilder::from_config(config).build().await?;
//! server.run().await
//! # }
//! ```

#![allow(async_fn_in_trait)]

pub mod client;
pub mod config;
pub mod discovery;
mod error;
pub mod logging;
pub mod server;
pub mod session;
mod wire;

pub use error::BlackjackError;

pub use blackjack_game as game;
pub use blackjack_protocol as protocol;
pub use blackjack_transport as transport;

pub mod prelude {
    pub use crate::client::{
        connect_and_play, ClientSummary, PlayerView, RoundReport, Seat,
        StandAt, Strategy,
    };
    pub use crate::config::{
        ClientConfig, ConfigError, DiscoveryConfig, ServerConfig,
        SessionConfig,
    };
    pub use crate::discovery::{bind_discovery_listener, wait_for_offer};
    pub use crate::server::{BlackjackServer, BlackjackServerBuilder};
    pub use crate::session::{run_session, SessionReport};
    pub use crate::BlackjackError;

    pub use blackjack_game::{Card, Hand, Suit};
    pub use blackjack_protocol::{Decision, Offer, Outcome, Request};
}
