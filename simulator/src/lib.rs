use oowee_types::{payout, Parity, PlayRequest, PlayResponse};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

mod api;
pub use api::Api;

mod state;
pub use state::{Ledger, SimulatorConfig};

/// Reasons the simulator refuses a wager.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlayError {
    #[error("login required")]
    Unauthorized,
    #[error("unknown account")]
    UnknownAccount,
    #[error("minimum bet is {minimum} points")]
    BelowMinimum { minimum: u64 },
    #[error("insufficient points: balance {balance}, bet {bet}")]
    InsufficientBalance { balance: u64, bet: u64 },
}

/// In-memory stand-in for the authoritative game server.
pub struct Simulator {
    pub config: SimulatorConfig,
    ledger: Mutex<Ledger>,
    rng: Mutex<StdRng>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let ledger = Ledger::new(&config.accounts);
        Self {
            config,
            ledger: Mutex::new(ledger),
            rng: Mutex::new(rng),
        }
    }

    pub fn latency(&self) -> Duration {
        self.config.latency()
    }

    pub fn deposit(&self, token: &str, amount: u64) -> u64 {
        lock(&self.ledger).credit(token, amount)
    }

    pub fn balance(&self, token: &str) -> Option<u64> {
        lock(&self.ledger).balance(token)
    }

    /// Settle one wager: debit the stake, roll, and credit the payout on a win.
    pub fn play(&self, token: &str, request: PlayRequest) -> Result<PlayResponse, PlayError> {
        if request.bet_amount < self.config.min_bet {
            return Err(PlayError::BelowMinimum {
                minimum: self.config.min_bet,
            });
        }

        let mut ledger = lock(&self.ledger);
        let mut balance = ledger.debit(token, request.bet_amount)?;

        let dice_number: u8 = lock(&self.rng).gen_range(1..=6);
        let result = Parity::of(dice_number);
        let win = result == request.betting_type;
        let earned_amount = payout(request.bet_amount, win);
        if earned_amount > 0 {
            balance = ledger.credit(token, earned_amount);
        }
        drop(ledger);

        debug!(dice_number, %result, "rolled");
        info!(
            bet = request.bet_amount,
            parity = %request.betting_type,
            win,
            balance,
            "settled dice round"
        );

        Ok(PlayResponse {
            win,
            dice_number,
            current_balance: balance,
            result: Some(result),
            earned_amount: Some(earned_amount),
            message: Some(if win {
                "You won!".to_string()
            } else {
                "You lost this one.".to_string()
            }),
        })
    }
}
