//! Play odd/even dice rounds from the terminal against a running server.

use anyhow::{bail, Context, Result};
use clap::Parser;
use oowee_client::{Client, Config, DiceGame, GameError, Outcome};
use oowee_types::Parity;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn, Level};

const TOKEN_ENV: &str = "OOWEE_TOKEN";

#[derive(Parser, Debug)]
#[command(author, version, about = "Play odd/even dice rounds")]
struct Args {
    /// YAML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server URL (overrides the config file).
    #[arg(short, long)]
    url: Option<String>,

    /// Bearer token (falls back to $OOWEE_TOKEN).
    #[arg(short, long)]
    token: Option<String>,

    #[arg(short, long)]
    amount: Option<u64>,

    #[arg(short, long)]
    parity: Parity,

    #[arg(short, long, default_value = "1")]
    rounds: u32,

    #[arg(long)]
    log_level: Option<String>,
}

fn face_glyph(face: u8) -> char {
    match face {
        1 => '⚀',
        2 => '⚁',
        3 => '⚂',
        4 => '⚃',
        5 => '⚄',
        6 => '⚅',
        _ => '?',
    }
}

fn resolve_config(args: &Args, env_token: Option<String>) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(url) = &args.url {
        config.base_url = url.clone();
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    config.token = args.token.clone().or(env_token).or(config.token);
    Ok(config)
}

fn summary(outcome: &Outcome) -> String {
    format!(
        "{} {} ({:+}) balance {}",
        face_glyph(outcome.dice_number),
        if outcome.win { "WIN" } else { "LOSE" },
        outcome.net_change(),
        outcome.current_balance
    )
}

async fn play_round(game: &DiceGame<Client>) -> Result<Outcome, GameError> {
    let mut frames = game.subscribe();
    let ticket = game.submit()?;
    let round = ticket.id();
    let wait = ticket.wait();
    tokio::pin!(wait);
    loop {
        tokio::select! {
            result = &mut wait => {
                println!();
                if let Ok(outcome) = &result {
                    info!(%round, "round finished");
                    println!("{}", summary(outcome));
                }
                return result;
            }
            changed = frames.changed() => {
                if changed.is_err() {
                    return Err(GameError::Abandoned);
                }
                let face = frames.borrow_and_update().face;
                print!("\r{}", face_glyph(face));
                let _ = std::io::stdout().flush();
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = resolve_config(&args, std::env::var(TOKEN_ENV).ok())?;

    let level = Level::from_str(&config.log_level).context("invalid log level")?;
    tracing_subscriber::fmt().with_max_level(level).init();

    let Some(token) = config.token.clone() else {
        bail!("no token: pass --token or set {TOKEN_ENV}");
    };
    let client = Client::new(&config.base_url)?.with_token(token);
    let game = DiceGame::new(client, config.game.clone());
    if let Some(amount) = args.amount {
        game.set_amount(i64::try_from(amount).unwrap_or(i64::MAX))?;
    }
    game.set_parity(args.parity)?;

    info!(
        url = %config.base_url,
        parity = %args.parity,
        rounds = args.rounds,
        "dice client online"
    );
    for _ in 0..args.rounds {
        match play_round(&game).await {
            Ok(_) => {}
            Err(err) if err.is_validation() => return Err(err.into()),
            Err(err) => warn!(%err, "round failed"),
        }
    }
    Ok(())
}
