//! The player's side of a session.
//!
//! [`play_session`] mirrors the server's sequencing message for message.
//! The client knows a round's shape without being told: three opening
//! cards, one card answering each Hit, and then dealer cards until the
//! terminal event. Decisions come from a [`Strategy`].

use std::net::SocketAddr;

use blackjack_game::card::hand_value;
use blackjack_game::{Card, Hand};
use blackjack_protocol::{Decision, Outcome, Request, ServerEvent};
use blackjack_transport::{Connection, TcpConnection};

use crate::config::SessionConfig;
use crate::wire::{recv_packet, send_packet};
use crate::BlackjackError;

/// Which side of the table a card went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    Player,
    Dealer,
}

/// What the player can see when asked for a decision.
#[derive(Debug, Clone, Copy)]
pub struct PlayerView<'a> {
    /// The player's cards so far.
    pub hand: &'a Hand,
    /// The dealer's face-up card.
    pub dealer_up: Card,
}

impl PlayerView<'_> {
    /// Current player total.
    pub fn total(&self) -> u32 {
        hand_value(self.hand.cards())
    }
}

/// Chooses the player's moves.
///
/// Only `decide` is required. The other hooks let an interactive front
/// end show the game as it unfolds. Default: no-op.
pub trait Strategy: Send {
    /// Picks the next move.
    async fn decide(&mut self, view: &PlayerView<'_>) -> Decision;

    /// Called for every card as it arrives.
    fn on_card(&mut self, _seat: Seat, _card: Card) {}

    /// Called once per round after the terminal event.
    fn on_round_over(&mut self, _report: &RoundReport) {}
}

/// Hits below a fixed total, stands at or above it.
#[derive(Debug, Clone, Copy)]
pub struct StandAt(pub u32);

impl Strategy for StandAt {
    async fn decide(&mut self, view: &PlayerView<'_>) -> Decision {
        if view.total() < self.0 {
            Decision::Hit
        } else {
            Decision::Stand
        }
    }
}

/// The full record of one round as the client saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub player: Hand,
    /// Every dealer card the server revealed.
    pub dealer: Hand,
    pub player_bust: bool,
    pub outcome: Outcome,
}

/// Results of a whole client session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSummary {
    pub rounds: Vec<RoundReport>,
}

impl ClientSummary {
    pub fn wins(&self) -> usize {
        self.count(Outcome::Win)
    }

    pub fn losses(&self) -> usize {
        self.count(Outcome::Loss)
    }

    pub fn ties(&self) -> usize {
        self.count(Outcome::Tie)
    }

    /// Fraction of rounds won, `0.0` when no round was played.
    pub fn win_rate(&self) -> f64 {
        if self.rounds.is_empty() {
            0.0
        } else {
            self.wins() as f64 / self.rounds.len() as f64
        }
    }

    fn count(&self, outcome: Outcome) -> usize {
        self.rounds.iter().filter(|r| r.outcome == outcome).count()
    }
}

/// Sends `request` and plays every round it asks for.
pub async fn play_session<C, S>(
    conn: &C,
    request: &Request,
    strategy: &mut S,
    config: &SessionConfig,
) -> Result<ClientSummary, BlackjackError>
where
    C: Connection,
    S: Strategy,
{
    send_packet(conn, request).await?;
    tracing::info!(
        conn_id = %conn.id(),
        client = %request.client_name,
        rounds = request.rounds,
        "request sent"
    );

    let mut summary = ClientSummary::default();
    for number in 1..=request.rounds {
        let report = play_round(conn, strategy, config).await?;
        tracing::debug!(
            round = number,
            player = report.player.value(),
            dealer = report.dealer.value(),
            outcome = %report.outcome,
            "round over"
        );
        strategy.on_round_over(&report);
        summary.rounds.push(report);
    }

    Ok(summary)
}

/// Connects to `addr`, plays the session, and closes the connection.
pub async fn connect_and_play<S: Strategy>(
    addr: SocketAddr,
    request: &Request,
    strategy: &mut S,
    config: &SessionConfig,
) -> Result<ClientSummary, BlackjackError> {
    let conn = TcpConnection::connect(addr).await?;
    tracing::info!(%addr, conn_id = %conn.id(), "connected");

    let result = play_session(&conn, request, strategy, config).await;
    if let Err(e) = conn.close().await {
        tracing::debug!(error = %e, "close failed");
    }
    result
}

async fn play_round<C, S>(
    conn: &C,
    strategy: &mut S,
    config: &SessionConfig,
) -> Result<RoundReport, BlackjackError>
where
    C: Connection,
    S: Strategy,
{
    let mut player = Hand::new();
    let mut dealer = Hand::new();

    for _ in 0..2 {
        let card = recv_card(conn, config).await?;
        strategy.on_card(Seat::Player, card);
        player.push(card);
    }
    let dealer_up = recv_card(conn, config).await?;
    strategy.on_card(Seat::Dealer, dealer_up);
    dealer.push(dealer_up);

    // Mirror of the server's player turn: a bust is only checked after
    // a Hit, never on the opening two cards.
    let mut player_bust = false;
    loop {
        let view = PlayerView {
            hand: &player,
            dealer_up,
        };
        let decision = strategy.decide(&view).await;
        send_packet(conn, &decision).await?;

        if decision == Decision::Stand {
            break;
        }

        let card = recv_card(conn, config).await?;
        strategy.on_card(Seat::Player, card);
        player.push(card);
        if player.is_bust() {
            player_bust = true;
            break;
        }
    }

    loop {
        let event: ServerEvent =
            recv_packet(conn, config.idle_timeout).await?;
        match event {
            ServerEvent::Card { rank, suit } => {
                let card = Card::from_wire(rank, suit)?;
                strategy.on_card(Seat::Dealer, card);
                dealer.push(card);
            }
            ServerEvent::RoundOver(outcome) => {
                return Ok(RoundReport {
                    player,
                    dealer,
                    player_bust,
                    outcome,
                });
            }
        }
    }
}

/// Reads an event that must be a card.
async fn recv_card<C: Connection>(
    conn: &C,
    config: &SessionConfig,
) -> Result<Card, BlackjackError> {
    match recv_packet(conn, config.idle_timeout).await? {
        ServerEvent::Card { rank, suit } => Ok(Card::from_wire(rank, suit)?),
        ServerEvent::RoundOver(outcome) => Err(BlackjackError::UnexpectedEvent(
            format!("round ended ({outcome}) while a card was expected"),
        )),
    }
}
