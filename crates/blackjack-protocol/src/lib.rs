//! Wire protocol for networked Blackjack.
//!
//! This crate defines the "language" that client and server speak:
//!
//! - **Constants** ([`constants`]) — magic cookie, type tags, ports and
//!   fixed message sizes, shared by both peers.
//! - **Types** ([`Offer`], [`Request`], [`Decision`], [`ServerEvent`]) —
//!   the messages that travel on the wire.
//! - **Codec** ([`Packet`] trait) — how those messages are converted to
//!   and from their fixed-size byte layouts.
//! - **Errors** ([`ProtocolError`]) — why a packet was rejected.
//!
//! # Architecture
//!
//! The protocol layer is pure: it never touches a socket. Transport moves
//! bytes, this crate gives them meaning.
//!
//! ```text
//! Transport (exact-size reads) → Protocol (Packet) → Game (Round engine)
//! ```

pub mod constants;

mod codec;
mod error;
mod types;

pub use codec::Packet;
pub use error::ProtocolError;
pub use types::{Decision, Offer, Outcome, Request, ServerEvent};
