//! Byte layouts for every message type.
//!
//! Framing is purely by size: each message type has one fixed length and
//! there is no length prefix. A reader learns what to expect from
//! [`Packet::SIZE`] and must read exactly that many bytes.
//!
//! Every decoder runs the same checks in the same order:
//!
//! 1. total length (at least [`Packet::SIZE`] bytes),
//! 2. magic cookie,
//! 3. type tag,
//! 4. message-specific fields.
//!
//! The first failing check returns its error. Bytes past `SIZE` are
//! ignored.
//!
//! ## Example
//!
//! ```rust
//! use blackjack_protocol::{Packet, Request};
//!
//! let request = Request { rounds: 3, client_name: "alice".into() };
//! let bytes = request.encode();
//! assert_eq!(bytes.len(), Request::SIZE);
//!
//! let decoded = Request::decode(&bytes).unwrap();
//! assert_eq!(decoded, request);
//! ```

use crate::constants::{
    DECISION_HIT, DECISION_SIZE, DECISION_STAND, EVENT_SIZE, HEADER_SIZE,
    MAGIC_COOKIE, NAME_LEN, OFFER_SIZE, OFFER_TYPE, PAYLOAD_TYPE,
    REQUEST_SIZE, REQUEST_TYPE, RESULT_NOT_OVER, TOKEN_LEN,
};
use crate::{Decision, Offer, Outcome, ProtocolError, Request, ServerEvent};

/// A message with a fixed binary layout.
///
/// `encode` is total: any value of the type produces exactly `SIZE`
/// bytes. `decode` is the only place input is validated.
pub trait Packet: Sized {
    /// Exact number of bytes this message occupies on the wire.
    const SIZE: usize;

    /// The type tag written after the magic cookie.
    const TYPE: u8;

    /// Short name used in error messages.
    const NAME: &'static str;

    /// Serializes the message into exactly [`Self::SIZE`] bytes.
    fn encode(&self) -> Vec<u8>;

    /// Parses a message, rejecting it on the first failed check.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] describing the first check that failed.
    fn decode(data: &[u8]) -> Result<Self, ProtocolError>;
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Starts a buffer with the magic cookie and the type tag of `P`.
fn header<P: Packet>() -> Vec<u8> {
    let mut buf = Vec::with_capacity(P::SIZE);
    buf.extend_from_slice(&MAGIC_COOKIE.to_be_bytes());
    buf.push(P::TYPE);
    buf
}

/// Runs the length, magic and type checks for `P`, in that order.
///
/// On success returns the body: the `SIZE - HEADER_SIZE` bytes after the
/// header.
fn check_header<P: Packet>(data: &[u8]) -> Result<&[u8], ProtocolError> {
    if data.len() < P::SIZE {
        return Err(ProtocolError::Truncated {
            message: P::NAME,
            expected: P::SIZE,
            actual: data.len(),
        });
    }

    let magic = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    if magic != MAGIC_COOKIE {
        return Err(ProtocolError::BadMagic(magic));
    }

    if data[4] != P::TYPE {
        return Err(ProtocolError::BadType {
            expected: P::TYPE,
            found: data[4],
        });
    }

    Ok(&data[HEADER_SIZE..P::SIZE])
}

/// Writes a name as a fixed-width, NUL-padded UTF-8 field.
///
/// Names longer than [`NAME_LEN`] bytes are cut at the last character
/// boundary that fits, so the field never holds a split code point.
fn put_name(buf: &mut Vec<u8>, name: &str) {
    let mut end = name.len().min(NAME_LEN);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    buf.extend_from_slice(&name.as_bytes()[..end]);
    buf.resize(buf.len() + (NAME_LEN - end), 0);
}

/// Reads a fixed-width name field. The first NUL ends the string.
///
/// Bytes that are not valid UTF-8 are dropped rather than rejected: a
/// name is display-only, and a peer that cut a multi-byte character at
/// the field edge should still show the rest of its name.
fn get_name(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    field[..end].utf8_chunks().map(|chunk| chunk.valid()).collect()
}

// ---------------------------------------------------------------------------
// Offer
// ---------------------------------------------------------------------------

impl Packet for Offer {
    const SIZE: usize = OFFER_SIZE;
    const TYPE: u8 = OFFER_TYPE;
    const NAME: &'static str = "offer";

    fn encode(&self) -> Vec<u8> {
        let mut buf = header::<Self>();
        buf.extend_from_slice(&self.tcp_port.to_be_bytes());
        put_name(&mut buf, &self.server_name);
        buf
    }

    fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let body = check_header::<Self>(data)?;
        Ok(Self {
            tcp_port: u16::from_be_bytes([body[0], body[1]]),
            server_name: get_name(&body[2..]),
        })
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

impl Packet for Request {
    const SIZE: usize = REQUEST_SIZE;
    const TYPE: u8 = REQUEST_TYPE;
    const NAME: &'static str = "request";

    fn encode(&self) -> Vec<u8> {
        let mut buf = header::<Self>();
        buf.push(self.rounds);
        put_name(&mut buf, &self.client_name);
        buf
    }

    fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let body = check_header::<Self>(data)?;
        let rounds = body[0];
        if rounds == 0 {
            return Err(ProtocolError::InvalidRounds);
        }
        Ok(Self {
            rounds,
            client_name: get_name(&body[1..]),
        })
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

impl Packet for Decision {
    const SIZE: usize = DECISION_SIZE;
    const TYPE: u8 = PAYLOAD_TYPE;
    const NAME: &'static str = "decision";

    fn encode(&self) -> Vec<u8> {
        let mut buf = header::<Self>();
        let token = match self {
            Self::Hit => DECISION_HIT,
            Self::Stand => DECISION_STAND,
        };
        buf.extend_from_slice(&token);
        buf
    }

    fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let body = check_header::<Self>(data)?;
        let mut token = [0u8; TOKEN_LEN];
        token.copy_from_slice(body);
        match token {
            DECISION_HIT => Ok(Self::Hit),
            DECISION_STAND => Ok(Self::Stand),
            other => Err(ProtocolError::UnknownDecision(other)),
        }
    }
}

// ---------------------------------------------------------------------------
// ServerEvent
// ---------------------------------------------------------------------------

impl Packet for ServerEvent {
    const SIZE: usize = EVENT_SIZE;
    const TYPE: u8 = PAYLOAD_TYPE;
    const NAME: &'static str = "server event";

    fn encode(&self) -> Vec<u8> {
        let mut buf = header::<Self>();
        let (result, rank, suit) = match *self {
            Self::Card { rank, suit } => (RESULT_NOT_OVER, rank, suit),
            Self::RoundOver(outcome) => (outcome.code(), 0, 0),
        };
        buf.push(result);
        buf.extend_from_slice(&rank.to_be_bytes());
        buf.push(suit);
        buf
    }

    fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let body = check_header::<Self>(data)?;
        let result = body[0];
        if result == RESULT_NOT_OVER {
            return Ok(Self::Card {
                rank: u16::from_be_bytes([body[1], body[2]]),
                suit: body[3],
            });
        }
        // Card fields of a terminal event carry no meaning.
        Outcome::from_code(result)
            .map(Self::RoundOver)
            .ok_or(ProtocolError::UnknownResult(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_layout() {
        let bytes = Offer {
            tcp_port: 0x1234,
            server_name: "dealer".into(),
        }
        .encode();

        assert_eq!(bytes.len(), 39);
        assert_eq!(&bytes[..4], &[0xab, 0xcd, 0xdc, 0xba]);
        assert_eq!(bytes[4], 0x2);
        assert_eq!(&bytes[5..7], &[0x12, 0x34]);
        assert_eq!(&bytes[7..13], b"dealer");
        assert!(bytes[13..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_offer_round_trip() {
        let offer = Offer {
            tcp_port: 40_001,
            server_name: "BlackijeckyServer".into(),
        };
        assert_eq!(Offer::decode(&offer.encode()).unwrap(), offer);
    }

    #[test]
    fn test_long_name_is_truncated_to_field_width() {
        let long = "x".repeat(50);
        let bytes = Offer {
            tcp_port: 1,
            server_name: long,
        }
        .encode();
        assert_eq!(bytes.len(), Offer::SIZE);

        let decoded = Offer::decode(&bytes).unwrap();
        assert_eq!(decoded.server_name, "x".repeat(32));
    }

    #[test]
    fn test_exactly_32_byte_name_has_no_terminator() {
        let name = "n".repeat(32);
        let request = Request {
            rounds: 1,
            client_name: name.clone(),
        };
        let decoded = Request::decode(&request.encode()).unwrap();
        assert_eq!(decoded.client_name, name);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        // 31 ASCII bytes + a 2-byte 'é' would be 33 bytes; 'é' must go.
        let name = format!("{}é", "a".repeat(31));
        let bytes = Request {
            rounds: 1,
            client_name: name,
        }
        .encode();
        assert_eq!(bytes.len(), Request::SIZE);

        let decoded = Request::decode(&bytes).unwrap();
        assert_eq!(decoded.client_name, "a".repeat(31));
    }

    #[test]
    fn test_name_decode_stops_at_first_nul() {
        let mut bytes = Request {
            rounds: 2,
            client_name: "bob".into(),
        }
        .encode();
        // Garbage after the terminator is ignored.
        bytes[6 + 4] = b'z';
        let decoded = Request::decode(&bytes).unwrap();
        assert_eq!(decoded.client_name, "bob");
    }

    #[test]
    fn test_name_decode_drops_cut_multibyte_tail() {
        let mut bytes = Request {
            rounds: 1,
            client_name: "a".repeat(31),
        }
        .encode();
        // First byte of "é" in the last slot, its second byte cut off.
        bytes[6 + 31] = 0xc3;
        let decoded = Request::decode(&bytes).unwrap();
        assert_eq!(decoded.client_name, "a".repeat(31));
    }

    #[test]
    fn test_name_decode_drops_invalid_bytes_mid_name() {
        let mut bytes = Offer {
            tcp_port: 1,
            server_name: "ab".into(),
        }
        .encode();
        bytes[7] = b'a';
        bytes[8] = 0xff;
        bytes[9] = b'b';
        let decoded = Offer::decode(&bytes).unwrap();
        assert_eq!(decoded.server_name, "ab");
        assert!(!decoded.server_name.contains('\u{FFFD}'));
    }

    #[test]
    fn test_request_layout() {
        let bytes = Request {
            rounds: 255,
            client_name: "c".into(),
        }
        .encode();
        assert_eq!(bytes.len(), 38);
        assert_eq!(bytes[4], 0x3);
        assert_eq!(bytes[5], 255);
        assert_eq!(bytes[6], b'c');
    }

    #[test]
    fn test_request_zero_rounds_rejected() {
        let bytes = Request {
            rounds: 0,
            client_name: "c".into(),
        }
        .encode();
        assert_eq!(Request::decode(&bytes), Err(ProtocolError::InvalidRounds));
    }

    #[test]
    fn test_decision_tokens_on_wire() {
        let hit = Decision::Hit.encode();
        let stand = Decision::Stand.encode();
        assert_eq!(hit.len(), 10);
        assert_eq!(&hit[5..], b"Hittt");
        assert_eq!(&stand[5..], b"Stand");
        assert_eq!(Decision::decode(&hit).unwrap(), Decision::Hit);
        assert_eq!(Decision::decode(&stand).unwrap(), Decision::Stand);
    }

    #[test]
    fn test_unknown_decision_token_rejected() {
        let mut bytes = Decision::Stand.encode();
        bytes[5..].copy_from_slice(b"Hit\0\0");
        assert_eq!(
            Decision::decode(&bytes),
            Err(ProtocolError::UnknownDecision(*b"Hit\0\0"))
        );
    }

    #[test]
    fn test_all_zero_decision_token_rejected() {
        let mut bytes = Decision::Hit.encode();
        bytes[5..].fill(0);
        assert!(matches!(
            Decision::decode(&bytes),
            Err(ProtocolError::UnknownDecision(_))
        ));
    }

    #[test]
    fn test_event_card_layout() {
        let bytes = ServerEvent::Card { rank: 13, suit: 3 }.encode();
        assert_eq!(bytes.len(), 9);
        assert_eq!(bytes[4], 0x4);
        assert_eq!(bytes[5], 0x0);
        assert_eq!(&bytes[6..8], &[0x00, 0x0d]);
        assert_eq!(bytes[8], 3);
    }

    #[test]
    fn test_terminal_event_has_zeroed_card_fields() {
        let bytes = ServerEvent::RoundOver(Outcome::Loss).encode();
        assert_eq!(bytes[5], 0x2);
        assert_eq!(&bytes[6..], &[0, 0, 0]);
    }

    #[test]
    fn test_terminal_event_ignores_card_fields_on_decode() {
        let mut bytes = ServerEvent::RoundOver(Outcome::Win).encode();
        bytes[7] = 5;
        bytes[8] = 2;
        assert_eq!(
            ServerEvent::decode(&bytes).unwrap(),
            ServerEvent::RoundOver(Outcome::Win)
        );
    }

    #[test]
    fn test_unknown_result_code_rejected() {
        let mut bytes = ServerEvent::Card { rank: 2, suit: 1 }.encode();
        bytes[5] = 0x7;
        assert_eq!(
            ServerEvent::decode(&bytes),
            Err(ProtocolError::UnknownResult(0x7))
        );
    }

    #[test]
    fn test_length_checked_before_magic() {
        // Wrong magic AND too short: the length error wins.
        let err = Decision::decode(&[0, 0, 0, 0, 4]).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::Truncated {
                message: "decision",
                expected: 10,
                actual: 5,
            }
        );
    }

    #[test]
    fn test_magic_checked_before_type() {
        let mut bytes = Request {
            rounds: 1,
            client_name: "a".into(),
        }
        .encode();
        bytes[0] = 0;
        bytes[4] = 0x9;
        assert!(matches!(
            Request::decode(&bytes),
            Err(ProtocolError::BadMagic(_))
        ));
    }

    #[test]
    fn test_type_checked_before_fields() {
        // A request tag on a decision-sized packet with a garbage token.
        let mut bytes = Decision::Hit.encode();
        bytes[4] = 0x3;
        bytes[5..].fill(0xff);
        assert_eq!(
            Decision::decode(&bytes),
            Err(ProtocolError::BadType {
                expected: 0x4,
                found: 0x3,
            })
        );
    }

    #[test]
    fn test_trailing_bytes_are_ignored() {
        let mut bytes = Offer {
            tcp_port: 7,
            server_name: "s".into(),
        }
        .encode();
        bytes.extend_from_slice(&[1, 2, 3]);
        assert_eq!(Offer::decode(&bytes).unwrap().tcp_port, 7);
    }
}
