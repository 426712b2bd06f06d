use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::round::Round;

/// Which background ticker drives the cosmetic display value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickerMode {
    /// Slow decorative rolls before any result is shown.
    Idle,
    /// Fast rolls while the outcome is pending.
    Rolling,
    /// A result is on screen.
    Stopped,
}

impl TickerMode {
    pub(crate) fn for_round(round: &Round) -> Self {
        match round {
            Round::Idle => TickerMode::Idle,
            Round::InFlight { .. } => TickerMode::Rolling,
            Round::Resolved { .. } => TickerMode::Stopped,
        }
    }
}

/// The only handle to the background ticker task.
///
/// Every tick carries the generation it was started with; stopping bumps the
/// generation so a tick already in progress cannot write afterwards.
pub(crate) struct Ticker {
    mode: TickerMode,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl Ticker {
    pub(crate) fn new() -> Self {
        Self {
            mode: TickerMode::Stopped,
            generation: 0,
            task: None,
        }
    }

    pub(crate) fn mode(&self) -> TickerMode {
        self.mode
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.mode != TickerMode::Stopped && self.generation == generation
    }

    pub(crate) fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation = self.generation.wrapping_add(1);
        self.mode = TickerMode::Stopped;
    }

    /// Replace the running ticker with one in `mode`. `spawn` gets the new
    /// generation and must return the task driving it.
    pub(crate) fn start<F>(&mut self, mode: TickerMode, spawn: F)
    where
        F: FnOnce(u64) -> JoinHandle<()>,
    {
        self.stop();
        if mode == TickerMode::Stopped {
            return;
        }
        self.task = Some(spawn(self.generation));
        self.mode = mode;
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Call `on_tick` every `period` (first call one period from now) until it
/// returns false.
pub(crate) fn spawn<F>(period: Duration, mut on_tick: F) -> JoinHandle<()>
where
    F: FnMut() -> bool + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if !on_tick() {
                return;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[tokio::test(start_paused = true)]
    async fn stop_invalidates_generation() {
        let mut ticker = Ticker::new();
        assert_eq!(ticker.mode(), TickerMode::Stopped);

        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        ticker.start(TickerMode::Rolling, |_| {
            spawn(Duration::from_millis(80), move || {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            })
        });
        let generation = ticker.generation();
        assert!(ticker.is_current(generation));

        time::sleep(Duration::from_millis(250)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        ticker.stop();
        assert!(!ticker.is_current(generation));
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn start_replaces_previous_task() {
        let mut ticker = Ticker::new();
        let fast = Arc::new(AtomicUsize::new(0));
        let slow = Arc::new(AtomicUsize::new(0));

        let counter = fast.clone();
        ticker.start(TickerMode::Rolling, |_| {
            spawn(Duration::from_millis(80), move || {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            })
        });
        time::sleep(Duration::from_millis(100)).await;

        let counter = slow.clone();
        ticker.start(TickerMode::Idle, |_| {
            spawn(Duration::from_millis(800), move || {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            })
        });
        assert_eq!(ticker.mode(), TickerMode::Idle);
        time::sleep(Duration::from_millis(1_000)).await;

        assert_eq!(fast.load(Ordering::SeqCst), 1);
        assert_eq!(slow.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn starting_stopped_spawns_nothing() {
        let mut ticker = Ticker::new();
        ticker.start(TickerMode::Stopped, |_| panic!("must not spawn"));
        assert_eq!(ticker.mode(), TickerMode::Stopped);
    }
}
