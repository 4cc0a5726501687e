use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::{error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use awale::board::{Board, Side, StartPolicy};
use awale::error::GameError;
use awale::eval::WeightedEvaluator;
use awale::game::Game;
use awale::player::{AiPlayer, HumanPlayer, Player};
use awale::remote;
use awale::search::{DepthPolicy, SearchConfig, SearchEngine};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    HumanVsAi,
    AiVsHuman,
    AiVsAi,
    AiVsRemote,
    RemoteVsAi,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum First {
    One,
    Two,
    Random,
}

impl First {
    fn policy(self) -> StartPolicy {
        match self {
            First::One => StartPolicy::Fixed(Side::One),
            First::Two => StartPolicy::Fixed(Side::Two),
            First::Random => StartPolicy::CoinFlip,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, value_enum, default_value_t = Mode::HumanVsAi)]
    mode: Mode,
    #[arg(long, value_enum, default_value_t = First::Random)]
    first: First,
    #[arg(long, default_value = "localhost")]
    host: String,
    #[arg(long, default_value_t = 9999)]
    port: u16,
    #[arg(long, default_value_t = 2000)]
    time_budget_ms: u64,
    #[arg(long, default_value_t = 5)]
    depth_floor: u32,
    #[arg(long, default_value_t = 12)]
    max_depth: u32,
    /// Seed for the coin flip and the engines' random fallback
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value = "info")]
    log_level: log::Level,
}

impl Args {
    fn search_config(&self) -> SearchConfig {
        SearchConfig {
            time_budget: Some(Duration::from_millis(self.time_budget_ms)),
            depth: DepthPolicy { floor: self.depth_floor, max: self.max_depth },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), GameError> {
    let args = Args::parse();
    simple_logger::init_with_level(args.log_level)?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let board = Board::new(args.first.policy(), &mut rng);
    info!("{} starts", board.current_player());

    let config = args.search_config();
    let mut ai = || {
        let engine = SearchEngine::with_evaluator(
            config,
            Box::new(WeightedEvaluator::default()),
            StdRng::seed_from_u64(rng.gen()),
        );
        Player::Ai(AiPlayer::new(engine))
    };

    let mut relay = None;
    let (one, two) = match args.mode {
        Mode::HumanVsAi => (console_player(), ai()),
        Mode::AiVsHuman => (ai(), console_player()),
        Mode::AiVsAi => (ai(), ai()),
        Mode::AiVsRemote => {
            let (opponent, link) = remote::channel();
            relay = Some((link, Side::Two));
            (ai(), Player::Remote(opponent))
        }
        Mode::RemoteVsAi => {
            let (opponent, link) = remote::channel();
            relay = Some((link, Side::One));
            (Player::Remote(opponent), ai())
        }
    };

    let mut game = Game::new(board, one, two);

    if let Some((link, remote_side)) = relay {
        let address = format!("{}:{}", args.host, args.port);
        let stream = remote::accept_one(&address).await?;
        let snapshots = game.subscribe();
        tokio::spawn(async move {
            if let Err(e) = link.run(stream, remote_side, snapshots).await {
                error!("Relay stopped: {}", e);
            }
        });
    }

    let mut view = game.subscribe();
    tokio::spawn(async move {
        while view.changed().await.is_ok() {
            let board = view.borrow_and_update().board.clone();
            info!("\n{}", board);
        }
    });

    info!("\n{}", game.board());
    let status = game.run().await?;
    info!(
        "{} - final score {} to {}",
        status,
        game.board().captured(Side::One),
        game.board().captured(Side::Two)
    );
    Ok(())
}

/// Human player fed by lines typed on stdin.
fn console_player() -> Player {
    let (tx, rx) = mpsc::channel(8);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    error!("Error reading stdin: {:?}", e);
                    break;
                }
            }
        }
    });
    Player::Human(HumanPlayer::new(rx))
}
