use anyhow::{anyhow, Context, Result};
use clap::Parser;
use oowee_simulator::{Api, Simulator, SimulatorConfig};
use oowee_types::MIN_BET;
use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Local backend for the oowee dice game", long_about = None)]
struct Args {
    /// Host interface to bind (default: localhost).
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Seed for the die (random when omitted).
    #[arg(long)]
    seed: Option<u64>,

    /// Delay every game response by this many milliseconds.
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,

    #[arg(long, default_value_t = MIN_BET)]
    min_bet: u64,

    /// Seed an account as `token=balance` (repeatable).
    #[arg(long = "account", value_name = "TOKEN=BALANCE")]
    accounts: Vec<String>,
}

fn parse_account(raw: &str) -> Result<(String, u64)> {
    let (token, balance) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected TOKEN=BALANCE, got {raw:?}"))?;
    let token = token.trim();
    if token.is_empty() {
        return Err(anyhow!("empty token in {raw:?}"));
    }
    let balance = balance
        .trim()
        .parse::<u64>()
        .with_context(|| format!("invalid balance in {raw:?}"))?;
    Ok((token.to_string(), balance))
}

fn build_config(args: &Args) -> Result<SimulatorConfig> {
    let accounts = args
        .accounts
        .iter()
        .map(|raw| parse_account(raw))
        .collect::<Result<BTreeMap<_, _>>>()?;
    Ok(SimulatorConfig {
        seed: args.seed,
        latency_ms: args.latency_ms,
        min_bet: args.min_bet,
        accounts,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = build_config(&args)?;
    info!(
        accounts = config.accounts.len(),
        latency_ms = config.latency_ms,
        min_bet = config.min_bet,
        "starting simulator"
    );
    let simulator = Arc::new(Simulator::new(config));
    let router = Api::new(simulator).router();

    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "simulator listening");
    axum::serve(listener, router).await?;
    Ok(())
}
