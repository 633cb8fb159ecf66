//! Protocol-wide constants.
//!
//! Both peers must agree on every value in this module bit-for-bit. They
//! are plain `const` items so nothing in the process can mutate them.

/// Marker that opens every protocol message.
pub const MAGIC_COOKIE: u32 = 0xabcd_dcba;

/// Type tag of the discovery [`Offer`](crate::Offer) datagram.
pub const OFFER_TYPE: u8 = 0x2;

/// Type tag of the [`Request`](crate::Request) that opens a session.
pub const REQUEST_TYPE: u8 = 0x3;

/// Type tag shared by client decisions and server events.
///
/// The two are told apart by direction and size, never by tag.
pub const PAYLOAD_TYPE: u8 = 0x4;

/// Well-known UDP port that clients listen on for offers.
pub const DISCOVERY_PORT: u16 = 13122;

/// Width of every name field on the wire.
pub const NAME_LEN: usize = 32;

/// Width of the decision token field.
pub const TOKEN_LEN: usize = 5;

/// Token sent by a client that wants another card.
pub const DECISION_HIT: [u8; TOKEN_LEN] = *b"Hittt";

/// Token sent by a client that ends its turn.
pub const DECISION_STAND: [u8; TOKEN_LEN] = *b"Stand";

/// Length of the shared `magic + type` prefix.
pub const HEADER_SIZE: usize = 5;

/// `magic(4) | type(1) | tcp_port(2) | server_name(32)`
pub const OFFER_SIZE: usize = HEADER_SIZE + 2 + NAME_LEN;

/// `magic(4) | type(1) | rounds(1) | client_name(32)`
pub const REQUEST_SIZE: usize = HEADER_SIZE + 1 + NAME_LEN;

/// `magic(4) | type(1) | decision(5)`
pub const DECISION_SIZE: usize = HEADER_SIZE + TOKEN_LEN;

/// `magic(4) | type(1) | result(1) | rank(2) | suit(1)`
pub const EVENT_SIZE: usize = HEADER_SIZE + 1 + 2 + 1;

/// Result byte of an event that carries a card and keeps the round open.
pub const RESULT_NOT_OVER: u8 = 0x0;

/// Result byte of a tied round.
pub const RESULT_TIE: u8 = 0x1;

/// Result byte of a round the player lost.
pub const RESULT_LOSS: u8 = 0x2;

/// Result byte of a round the player won.
pub const RESULT_WIN: u8 = 0x3;
