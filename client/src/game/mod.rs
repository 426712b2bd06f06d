//! Round state machine behind the odd/even dice screen.
//!
//! A [DiceGame] owns the candidate [Wager], the current round, and the single
//! background ticker that animates the die. Submitting validates the wager,
//! snapshots it, and resolves no earlier than the configured minimum round
//! duration.

use oowee_types::{Parity, PlayRequest, PlayResponse};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{oneshot, watch};
use tokio::time::{self, Instant};
use tracing::{debug, info, trace, warn};

use crate::{config::GameConfig, Gateway};

mod round;
mod ticker;
mod wager;

pub use round::{Outcome, Phase, RoundId, RoundTicket};
pub use ticker::TickerMode;
pub use wager::Wager;

use round::Round;
use ticker::Ticker;

const TRANSIENT_FALLBACK: &str = "please try again later";

/// Conditions reported back to whoever drives the game.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("choose odd or even first")]
    SelectionRequired,
    #[error("minimum bet is {minimum} points (got {amount})")]
    MinimumBet { amount: u64, minimum: u64 },
    #[error("a round is already in flight")]
    RoundInFlight,
    #[error("round failed: {}", .message.as_deref().unwrap_or(TRANSIENT_FALLBACK))]
    Transient { message: Option<String> },
    #[error("round abandoned")]
    Abandoned,
}

impl GameError {
    /// Whether the wager itself must be corrected before resubmitting.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GameError::SelectionRequired | GameError::MinimumBet { .. }
        )
    }
}

/// Everything a screen needs to render the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameView {
    pub phase: Phase,
    pub round: Option<RoundId>,
    pub wager: Wager,
    pub outcome: Option<Outcome>,
    /// Face to draw: the outcome's face once resolved, else the animated value.
    pub face: u8,
    pub ticker: TickerMode,
}

struct State {
    wager: Wager,
    round: Round,
    display: u8,
    rounds_started: u64,
    ticker: Ticker,
    rng: StdRng,
}

impl State {
    fn view(&self) -> GameView {
        let outcome = self.round.outcome();
        GameView {
            phase: self.round.phase(),
            round: self.round.id(),
            wager: self.wager,
            outcome,
            face: outcome.map_or(self.display, |outcome| outcome.dice_number),
            ticker: self.ticker.mode(),
        }
    }

    fn roll_display(&mut self) {
        self.display = self.rng.gen_range(1..=6);
    }
}

struct Shared<G: Gateway> {
    gateway: Arc<G>,
    config: GameConfig,
    state: Mutex<State>,
    view: watch::Sender<GameView>,
    me: Weak<Shared<G>>,
}

impl<G: Gateway> Shared<G> {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &State) {
        self.view.send_replace(state.view());
    }

    /// Run the ticker that matches the current round, if it is not already running.
    fn sync_ticker(&self, state: &mut State) {
        let wanted = TickerMode::for_round(&state.round);
        if state.ticker.mode() == wanted {
            return;
        }
        let period = match wanted {
            TickerMode::Idle => self.config.idle_period(),
            TickerMode::Rolling => self.config.rolling_period(),
            TickerMode::Stopped => Duration::ZERO,
        };
        let me = self.me.clone();
        state.ticker.start(wanted, |generation| {
            ticker::spawn(period, move || {
                me.upgrade()
                    .is_some_and(|shared| shared.tick(generation))
            })
        });
        debug!(mode = ?wanted, ?period, "ticker switched");
    }

    /// Advance the display value. Returns false once `generation` is no
    /// longer the running ticker.
    fn tick(&self, generation: u64) -> bool {
        let mut state = self.lock();
        if !state.ticker.is_current(generation) {
            return false;
        }
        state.roll_display();
        trace!(face = state.display, mode = ?state.ticker.mode(), "tick");
        self.publish(&state);
        true
    }

    fn resolve(&self, id: RoundId, result: crate::Result<PlayResponse>) {
        let mut state = self.lock();
        let (request, started, reporter) = match std::mem::replace(&mut state.round, Round::Idle)
        {
            Round::InFlight {
                id: current,
                request,
                started,
                reporter,
            } if current == id => (request, started, reporter),
            other => {
                state.round = other;
                debug!(round = %id, "discarding stale response");
                return;
            }
        };
        let elapsed = started.elapsed();

        let report = match result {
            Ok(response) => match Outcome::from_response(&response, request.bet_amount) {
                Some(outcome) => Ok(outcome),
                None => {
                    warn!(round = %id, face = response.dice_number, "server returned an invalid face");
                    Err(GameError::Transient { message: None })
                }
            },
            Err(err) => {
                warn!(round = %id, ?elapsed, error = %err, "round failed");
                Err(GameError::Transient {
                    message: err.message(),
                })
            }
        };

        if let Ok(outcome) = &report {
            state.round = Round::Resolved {
                id,
                outcome: *outcome,
            };
            info!(
                round = %id,
                win = outcome.win,
                face = outcome.dice_number,
                balance = outcome.current_balance,
                ?elapsed,
                "round resolved"
            );
        }
        self.sync_ticker(&mut state);
        self.publish(&state);
        drop(state);

        // The caller may have dropped its ticket.
        let _ = reporter.send(report);
    }
}

/// Round issued by [DiceGame::submit]: wait for the later of the outcome and
/// the minimum duration, then hand the result back to the game.
async fn run_round<G: Gateway>(
    shared: Weak<Shared<G>>,
    gateway: Arc<G>,
    id: RoundId,
    request: PlayRequest,
    floor: Duration,
) {
    let result = tokio::try_join!(gateway.roll(request), async {
        time::sleep(floor).await;
        Ok::<_, crate::Error>(())
    })
    .map(|(response, ())| response);

    match shared.upgrade() {
        Some(shared) => shared.resolve(id, result),
        None => debug!(round = %id, "game dropped before round finished"),
    }
}

/// Handle to one dice screen.
///
/// Must be created inside a tokio runtime: the idle ticker starts immediately.
pub struct DiceGame<G: Gateway> {
    shared: Arc<Shared<G>>,
}

impl<G: Gateway> DiceGame<G> {
    pub fn new(gateway: G, config: GameConfig) -> Self {
        Self::with_gateway(Arc::new(gateway), config)
    }

    pub fn with_gateway(gateway: Arc<G>, config: GameConfig) -> Self {
        let rng = match config.display_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = State {
            wager: Wager::new(config.initial_amount, config.min_bet),
            round: Round::Idle,
            display: 1,
            rounds_started: 0,
            ticker: Ticker::new(),
            rng,
        };
        let (view, _) = watch::channel(state.view());
        let shared = Arc::new_cyclic(|me| Shared {
            gateway,
            config,
            state: Mutex::new(state),
            view,
            me: me.clone(),
        });
        {
            let mut state = shared.lock();
            shared.sync_ticker(&mut state);
            shared.publish(&state);
        }
        Self { shared }
    }

    pub fn config(&self) -> &GameConfig {
        &self.shared.config
    }

    pub fn view(&self) -> GameView {
        self.shared.lock().view()
    }

    /// Receive a new view on every change, including each ticker frame.
    pub fn subscribe(&self) -> watch::Receiver<GameView> {
        self.shared.view.subscribe()
    }

    fn configure(&self, edit: impl FnOnce(&mut Wager)) -> Result<Wager, GameError> {
        let mut state = self.shared.lock();
        if let Round::InFlight { id, .. } = &state.round {
            debug!(round = %id, "wager is locked while a round is in flight");
            return Err(GameError::RoundInFlight);
        }
        edit(&mut state.wager);
        self.shared.publish(&state);
        Ok(state.wager)
    }

    pub fn set_amount(&self, amount: i64) -> Result<Wager, GameError> {
        self.configure(|wager| wager.set_amount(amount))
    }

    pub fn adjust_amount(&self, delta: i64) -> Result<Wager, GameError> {
        self.configure(|wager| wager.adjust_amount(delta))
    }

    /// Quick-add chip.
    pub fn add_chip(&self, chip: u64) -> Result<Wager, GameError> {
        let delta = i64::try_from(chip).unwrap_or(i64::MAX);
        self.adjust_amount(delta)
    }

    pub fn step_down(&self) -> Result<Wager, GameError> {
        self.configure(Wager::step_down)
    }

    pub fn reset_amount(&self) -> Result<Wager, GameError> {
        self.configure(Wager::reset)
    }

    pub fn set_parity(&self, parity: Parity) -> Result<Wager, GameError> {
        self.configure(|wager| wager.set_parity(parity))
    }

    /// Start a round with the current wager.
    ///
    /// Validation failures are returned directly and send nothing. On success
    /// the previous outcome is cleared and the returned ticket resolves with
    /// the round's result.
    pub fn submit(&self) -> Result<RoundTicket, GameError> {
        let shared = &self.shared;
        let mut state = shared.lock();
        if state.round.is_in_flight() {
            return Err(GameError::RoundInFlight);
        }
        let request = state.wager.validate().inspect_err(|err| {
            debug!(%err, "submission rejected");
        })?;

        state.rounds_started += 1;
        let id = RoundId(state.rounds_started);
        let (reporter, receiver) = oneshot::channel();
        state.round = Round::InFlight {
            id,
            request,
            started: Instant::now(),
            reporter,
        };
        shared.sync_ticker(&mut state);
        shared.publish(&state);
        drop(state);

        info!(
            round = %id,
            amount = request.bet_amount,
            parity = %request.betting_type,
            "round submitted"
        );
        tokio::spawn(run_round(
            Arc::downgrade(shared),
            shared.gateway.clone(),
            id,
            request,
            shared.config.min_round_duration(),
        ));
        Ok(RoundTicket { id, receiver })
    }

    /// Give up on the in-flight round and return to idle. Its response, if it
    /// ever arrives, is discarded. Returns false when nothing was in flight.
    pub fn abandon(&self) -> bool {
        let mut state = self.shared.lock();
        if !state.round.is_in_flight() {
            return false;
        }
        if let Round::InFlight { id, reporter, .. } =
            std::mem::replace(&mut state.round, Round::Idle)
        {
            info!(round = %id, "round abandoned");
            let _ = reporter.send(Err(GameError::Abandoned));
        }
        self.shared.sync_ticker(&mut state);
        self.shared.publish(&state);
        true
    }

    /// Re-roll the idle die on demand. Only allowed while idle.
    pub fn nudge_demo(&self) -> bool {
        let mut state = self.shared.lock();
        if !matches!(state.round, Round::Idle) {
            return false;
        }
        state.roll_display();
        self.shared.publish(&state);
        true
    }
}

impl<G: Gateway> Drop for DiceGame<G> {
    fn drop(&mut self) {
        self.shared.lock().ticker.stop();
    }
}
