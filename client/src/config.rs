use anyhow::{Context, Result};
use oowee_types::{DEFAULT_BET, MIN_BET};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Timing and limits of the dice screen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub min_bet: u64,
    /// Amount the wager holds when the screen opens.
    pub initial_amount: u64,
    /// Floor on the time between submission and showing a result.
    pub min_round_ms: u64,
    /// Display refresh period while a round is in flight.
    pub rolling_tick_ms: u64,
    /// Display refresh period while waiting for the first bet.
    pub idle_tick_ms: u64,
    /// Seed for the cosmetic display value (random when omitted).
    pub display_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_bet: MIN_BET,
            initial_amount: DEFAULT_BET,
            min_round_ms: 1_200,
            rolling_tick_ms: 80,
            idle_tick_ms: 800,
            display_seed: None,
        }
    }
}

impl GameConfig {
    pub fn min_round_duration(&self) -> Duration {
        Duration::from_millis(self.min_round_ms)
    }

    // Tick periods are clamped to 1ms: a zero period would make the interval panic.
    pub fn rolling_period(&self) -> Duration {
        Duration::from_millis(self.rolling_tick_ms.max(1))
    }

    pub fn idle_period(&self) -> Duration {
        Duration::from_millis(self.idle_tick_ms.max(1))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration for the `dice` binary (from config file).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub game: GameConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            token: None,
            log_level: default_log_level(),
            game: GameConfig::default(),
        }
    }
}

impl Config {
    pub fn from_yaml(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).context("could not parse config file")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        Self::from_yaml(&raw)
    }
}
