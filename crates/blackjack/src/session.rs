//! Per-connection session driver.
//!
//! Each accepted connection gets its own Tokio task running
//! [`run_session`]. The flow is:
//!   1. Receive the Request → learn the round count and client name
//!   2. For each round: deal, loop on decisions, play the dealer
//!   3. Close the connection, whether the rounds finished or not
//!
//! Any failure ends the whole session. The protocol has no way to
//! resynchronize mid-stream, so nothing is retried.

use blackjack_game::{DeckSource, GameError, Round};
use blackjack_protocol::{Decision, Outcome, Request, ServerEvent};
use blackjack_transport::Connection;

use crate::config::SessionConfig;
use crate::wire::{recv_packet, send_packet};
use crate::BlackjackError;

/// What happened over one connection, from the player's point of view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub client_name: String,
    pub rounds_requested: u8,
    pub rounds_played: u8,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl SessionReport {
    fn record(&mut self, outcome: Outcome) {
        self.rounds_played += 1;
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Tie => self.ties += 1,
        }
    }
}

/// Runs one session from the Request to the last round.
///
/// Takes ownership of the connection and always closes it before
/// returning, on success and on error alike.
pub async fn run_session<C, D>(
    conn: C,
    config: &SessionConfig,
    decks: &mut D,
) -> Result<SessionReport, BlackjackError>
where
    C: Connection,
    D: DeckSource,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "session started");

    let result = play_session(&conn, config, decks).await;

    if let Err(e) = conn.close().await {
        tracing::debug!(%conn_id, error = %e, "close failed");
    }

    match &result {
        Ok(report) => tracing::info!(
            %conn_id,
            client = %report.client_name,
            rounds = report.rounds_played,
            wins = report.wins,
            losses = report.losses,
            ties = report.ties,
            "session finished"
        ),
        Err(BlackjackError::Game(e)) => {
            tracing::error!(%conn_id, error = %e, "round engine fault, session aborted");
        }
        Err(e) => tracing::info!(%conn_id, error = %e, "session aborted"),
    }

    result
}

async fn play_session<C, D>(
    conn: &C,
    config: &SessionConfig,
    decks: &mut D,
) -> Result<SessionReport, BlackjackError>
where
    C: Connection,
    D: DeckSource,
{
    let request: Request = recv_packet(conn, config.idle_timeout).await?;
    tracing::info!(
        conn_id = %conn.id(),
        client = %request.client_name,
        rounds = request.rounds,
        "request received"
    );

    let mut report = SessionReport {
        client_name: request.client_name,
        rounds_requested: request.rounds,
        ..SessionReport::default()
    };

    for number in 1..=request.rounds {
        let mut round = Round::new(decks.next_deck());
        let outcome = play_round(conn, config, &mut round).await?;
        tracing::info!(
            conn_id = %conn.id(),
            round = number,
            of = request.rounds,
            player = round.player_hand().value(),
            dealer = round.dealer_hand().value(),
            %outcome,
            "round finished"
        );
        report.record(outcome);
    }

    Ok(report)
}

/// Drives one round to its terminal event.
async fn play_round<C: Connection>(
    conn: &C,
    config: &SessionConfig,
    round: &mut Round,
) -> Result<Outcome, BlackjackError> {
    send_events(conn, &round.deal()?).await?;

    while round.awaiting_decision() {
        let decision: Decision =
            recv_packet(conn, config.idle_timeout).await?;
        if let Some(event) = round.decide(decision)? {
            send_packet(conn, &event).await?;
        }
    }

    send_events(conn, &round.finish()?).await?;

    round.outcome().ok_or_else(|| {
        BlackjackError::Game(GameError::InvalidTransition {
            state: round.state(),
            action: "read outcome",
        })
    })
}

async fn send_events<C: Connection>(
    conn: &C,
    events: &[ServerEvent],
) -> Result<(), BlackjackError> {
    for event in events {
        send_packet(conn, event).await?;
    }
    Ok(())
}
