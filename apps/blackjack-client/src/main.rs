//! Interactive Blackjack player.
//!
//! Asks for a round count, waits for a server offer on UDP, then plays
//! every round with decisions typed on stdin. If a session fails the
//! client goes back to listening for offers.

use blackjack::logging;
use blackjack::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

type Input = Lines<BufReader<Stdin>>;

/// Prompts for every decision and narrates the round.
struct Terminal {
    input: Input,
    rounds: u8,
    round: u8,
    player: Hand,
    dealer_seen: usize,
}

impl Terminal {
    fn new(input: Input, rounds: u8) -> Self {
        Self {
            input,
            rounds,
            round: 0,
            player: Hand::new(),
            dealer_seen: 0,
        }
    }
}

impl Strategy for Terminal {
    async fn decide(&mut self, view: &PlayerView<'_>) -> Decision {
        if view.hand.len() == 2 {
            println!("Player cards: {}, total={}", view.hand, view.total());
            println!("Dealer shows: {}", view.dealer_up);
        }

        loop {
            let Some(line) = prompt(&mut self.input, "Hit or Stand? ").await
            else {
                // stdin closed: nothing more to ask.
                return Decision::Stand;
            };
            match line.to_lowercase().as_str() {
                "hit" => return Decision::Hit,
                "stand" => {
                    println!("You chose to stand");
                    println!("Dealer turn:");
                    return Decision::Stand;
                }
                _ => println!("Invalid input"),
            }
        }
    }

    fn on_card(&mut self, seat: Seat, card: Card) {
        match seat {
            Seat::Player => {
                if self.player.is_empty() {
                    self.round += 1;
                    println!("\n--- Round {}/{} ---", self.round, self.rounds);
                }
                self.player.push(card);
                if self.player.len() > 2 {
                    println!("You drew {card}, total={}", self.player.value());
                    if self.player.is_bust() {
                        println!("Bust!");
                    }
                }
            }
            Seat::Dealer => {
                self.dealer_seen += 1;
                // Up card and hidden card first; only later ones are draws.
                if self.dealer_seen > 2 && !self.player.is_bust() {
                    println!("Dealer draws {card}");
                }
            }
        }
    }

    fn on_round_over(&mut self, report: &RoundReport) {
        println!("Dealer final hand: {}", report.dealer);
        match report.outcome {
            Outcome::Win => println!("You win!"),
            Outcome::Loss => println!("You lose!"),
            Outcome::Tie => println!("It's a tie!"),
        }
        self.player = Hand::new();
        self.dealer_seen = 0;
    }
}

/// Prints `text` and reads one trimmed line. `None` on end of input.
async fn prompt(input: &mut Input, text: &str) -> Option<String> {
    print!("{text}");
    // Best effort; a failed flush only delays the prompt.
    let _ = std::io::Write::flush(&mut std::io::stdout());
    match input.next_line().await {
        Ok(Some(line)) => Some(line.trim().to_string()),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read stdin");
            None
        }
    }
}

async fn ask_rounds(input: &mut Input) -> Option<u8> {
    loop {
        let line = prompt(input, "Enter number of rounds to play (1-255): ")
            .await?;
        match line.parse::<u32>() {
            Ok(n @ 1..=255) => return u8::try_from(n).ok(),
            Ok(_) => println!("Number of rounds must be between 1 and 255"),
            Err(_) => println!("Please enter a valid number"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = ClientConfig::from_env()?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let Some(rounds) = ask_rounds(&mut input).await else {
        return Ok(());
    };
    let request = Request {
        rounds,
        client_name: config.client_name.clone(),
    };

    let listener = bind_discovery_listener(config.discovery_port).await?;
    println!("Client started, listening for offer requests...");

    let mut terminal = Terminal::new(input, rounds);
    loop {
        let (server, offer) = wait_for_offer(&listener).await?;
        println!("Received offer from {} ({})", server.ip(), offer.server_name);

        match connect_and_play(server, &request, &mut terminal, &config.session)
            .await
        {
            Ok(summary) => {
                println!(
                    "\nFinished playing {} rounds, wins={}, losses={}, ties={}, win rate={:.2}",
                    summary.rounds.len(),
                    summary.wins(),
                    summary.losses(),
                    summary.ties(),
                    summary.win_rate()
                );
                return Ok(());
            }
            Err(e) => {
                tracing::error!(%server, error = %e, "session failed");
                println!("[Client] Error: {e}");
                terminal = Terminal::new(terminal.input, rounds);
            }
        }
    }
}
