//! Session-level tests over in-memory streams.
//!
//! The server side runs the real [`run_session`]; the client side either
//! speaks raw packets or uses [`blackjack::client::play_session`].

use std::time::Duration;

use blackjack::client::{self, StandAt};
use blackjack::game::{
    Card, Deck, GameError, ShuffledDecks, StackedDecks, Suit,
};
use blackjack::prelude::*;
use blackjack::protocol::{Packet, ServerEvent};
use blackjack::transport::{
    Connection, ConnectionId, StreamConnection, TransportError,
};
use tokio::io::DuplexStream;

// =========================================================================
// Helpers
// =========================================================================

type MemConnection = StreamConnection<DuplexStream>;

fn pair() -> (MemConnection, MemConnection) {
    let (a, b) = tokio::io::duplex(256);
    (
        StreamConnection::new(ConnectionId::new(1), a),
        StreamConnection::new(ConnectionId::new(2), b),
    )
}

fn config() -> SessionConfig {
    SessionConfig {
        idle_timeout: Duration::from_secs(5),
    }
}

fn c(rank: u8, suit: Suit) -> Card {
    Card::new(rank, suit).expect("valid card")
}

fn request(rounds: u8) -> Request {
    Request {
        rounds,
        client_name: "tester".to_string(),
    }
}

async fn recv_event(conn: &MemConnection) -> ServerEvent {
    let bytes = conn.recv_exact(ServerEvent::SIZE).await.unwrap();
    ServerEvent::decode(&bytes).unwrap()
}

fn card_event(rank: u16, suit: u8) -> ServerEvent {
    ServerEvent::Card { rank, suit }
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_single_round_stand_on_20_beats_dealer_18() {
    let (server_conn, client_conn) = pair();
    let mut decks = StackedDecks::new([Deck::from_cards([
        c(10, Suit::Hearts),
        c(13, Suit::Diamonds),
        c(9, Suit::Clubs),
        c(5, Suit::Spades),
        c(4, Suit::Hearts),
    ])]);

    let server = tokio::spawn(async move {
        run_session(server_conn, &config(), &mut decks).await
    });

    client_conn.send(&request(1).encode()).await.unwrap();

    assert_eq!(recv_event(&client_conn).await, card_event(10, 0));
    assert_eq!(recv_event(&client_conn).await, card_event(13, 1));
    assert_eq!(recv_event(&client_conn).await, card_event(9, 2));

    client_conn.send(&Decision::Stand.encode()).await.unwrap();

    assert_eq!(recv_event(&client_conn).await, card_event(5, 3));
    assert_eq!(recv_event(&client_conn).await, card_event(4, 0));

    // The terminal event carries zeroed card fields.
    let last = client_conn.recv_exact(ServerEvent::SIZE).await.unwrap();
    assert_eq!(last, vec![0xab, 0xcd, 0xdc, 0xba, 0x04, 0x03, 0, 0, 0]);

    let report = server.await.unwrap().unwrap();
    assert_eq!(report.client_name, "tester");
    assert_eq!(report.rounds_played, 1);
    assert_eq!(report.wins, 1);
}

#[tokio::test]
async fn test_session_closes_connection_after_last_round() {
    let (server_conn, client_conn) = pair();
    let mut decks = StackedDecks::new([Deck::from_cards([
        c(10, Suit::Hearts),
        c(10, Suit::Diamonds),
        c(10, Suit::Clubs),
        c(10, Suit::Spades),
    ])]);

    let server = tokio::spawn(async move {
        run_session(server_conn, &config(), &mut decks).await
    });

    client_conn.send(&request(1).encode()).await.unwrap();
    for _ in 0..3 {
        recv_event(&client_conn).await;
    }
    client_conn.send(&Decision::Stand.encode()).await.unwrap();

    assert_eq!(recv_event(&client_conn).await, card_event(10, 3));
    assert_eq!(
        recv_event(&client_conn).await,
        ServerEvent::RoundOver(Outcome::Tie)
    );

    let err = client_conn.recv_exact(1).await.unwrap_err();
    assert!(matches!(err, TransportError::ConnectionClosed { .. }));

    let report = server.await.unwrap().unwrap();
    assert_eq!(report.ties, 1);
}

#[tokio::test]
async fn test_running_out_of_decks_aborts_before_next_deal() {
    let (server_conn, client_conn) = pair();
    // One planned deck for a two-round request.
    let mut decks = StackedDecks::new([Deck::from_cards([
        c(10, Suit::Hearts),
        c(10, Suit::Diamonds),
        c(10, Suit::Clubs),
        c(7, Suit::Spades),
    ])]);

    let server = tokio::spawn(async move {
        run_session(server_conn, &config(), &mut decks).await
    });

    client_conn.send(&request(2).encode()).await.unwrap();
    for _ in 0..3 {
        recv_event(&client_conn).await;
    }
    client_conn.send(&Decision::Stand.encode()).await.unwrap();
    assert_eq!(recv_event(&client_conn).await, card_event(7, 3));
    assert_eq!(
        recv_event(&client_conn).await,
        ServerEvent::RoundOver(Outcome::Win)
    );

    let err = server.await.unwrap().unwrap_err();
    assert!(matches!(
        err,
        BlackjackError::Game(GameError::DeckExhausted)
    ));

    // Nothing of round two was sent before the connection closed.
    let closed = client_conn.recv_exact(ServerEvent::SIZE).await.unwrap_err();
    assert!(matches!(
        closed,
        TransportError::ConnectionClosed { received: 0, .. }
    ));
}

#[tokio::test]
async fn test_malformed_decision_aborts_session() {
    let (server_conn, client_conn) = pair();
    let mut decks = ShuffledDecks::from_seed(3);

    let server = tokio::spawn(async move {
        run_session(server_conn, &config(), &mut decks).await
    });

    client_conn.send(&request(2).encode()).await.unwrap();
    for _ in 0..3 {
        recv_event(&client_conn).await;
    }

    let mut bad = Decision::Hit.encode();
    bad[5..].copy_from_slice(b"Hitme");
    client_conn.send(&bad).await.unwrap();

    let err = server.await.unwrap().unwrap_err();
    assert!(matches!(err, BlackjackError::Protocol(_)));

    let closed = client_conn.recv_exact(ServerEvent::SIZE).await.unwrap_err();
    assert!(matches!(
        closed,
        TransportError::ConnectionClosed { received: 0, .. }
    ));
}

#[tokio::test]
async fn test_request_with_zero_rounds_is_rejected() {
    let (server_conn, client_conn) = pair();
    let mut decks = ShuffledDecks::from_seed(3);

    let server = tokio::spawn(async move {
        run_session(server_conn, &config(), &mut decks).await
    });

    let mut bytes = request(1).encode();
    bytes[5] = 0;
    client_conn.send(&bytes).await.unwrap();

    let err = server.await.unwrap().unwrap_err();
    assert!(matches!(err, BlackjackError::Protocol(_)));
}

#[tokio::test]
async fn test_client_disconnect_mid_request_ends_session() {
    let (server_conn, client_conn) = pair();
    let mut decks = ShuffledDecks::from_seed(3);

    let server = tokio::spawn(async move {
        run_session(server_conn, &config(), &mut decks).await
    });

    client_conn.send(&request(1).encode()[..10]).await.unwrap();
    client_conn.close().await.unwrap();

    let err = server.await.unwrap().unwrap_err();
    assert!(matches!(
        err,
        BlackjackError::Transport(TransportError::ConnectionClosed {
            expected: 38,
            received: 10,
        })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_silent_client_hits_idle_timeout() {
    let (server_conn, _client_conn) = pair();
    let mut decks = ShuffledDecks::from_seed(3);

    let err = run_session(server_conn, &config(), &mut decks)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BlackjackError::IdleTimeout {
            waiting_for: "request"
        }
    ));
}

#[tokio::test]
async fn test_client_and_server_agree_over_many_rounds() {
    let (server_conn, client_conn) = pair();
    let mut decks = ShuffledDecks::from_seed(2024);

    let server = tokio::spawn(async move {
        run_session(server_conn, &config(), &mut decks).await
    });

    let mut strategy = StandAt(17);
    let summary =
        client::play_session(&client_conn, &request(25), &mut strategy, &config())
            .await
            .unwrap();
    let report = server.await.unwrap().unwrap();

    assert_eq!(summary.rounds.len(), 25);
    assert_eq!(report.rounds_played, 25);
    assert_eq!(summary.wins() as u32, report.wins);
    assert_eq!(summary.losses() as u32, report.losses);
    assert_eq!(summary.ties() as u32, report.ties);

    for round in &summary.rounds {
        // Every round shows at least the up card and the hidden card.
        assert!(round.dealer.len() >= 2);
        if round.player_bust {
            assert_eq!(round.outcome, Outcome::Loss);
            assert_eq!(round.dealer.len(), 2);
        }
    }
}
