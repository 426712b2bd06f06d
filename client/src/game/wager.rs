use oowee_types::{Parity, PlayRequest, CHIP_STEP};

use super::GameError;

/// The candidate bet, edited freely until it is submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wager {
    amount: u64,
    parity: Option<Parity>,
    min_bet: u64,
}

impl Wager {
    pub fn new(amount: u64, min_bet: u64) -> Self {
        Self {
            amount,
            parity: None,
            min_bet,
        }
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn parity(&self) -> Option<Parity> {
        self.parity
    }

    pub fn min_bet(&self) -> u64 {
        self.min_bet
    }

    /// Replace the amount. Negative input clamps to zero; there is no upper
    /// bound since the server decides whether the balance covers it.
    pub fn set_amount(&mut self, amount: i64) {
        self.amount = amount.max(0).unsigned_abs();
    }

    /// Add `delta` to the amount. Decrements never take the amount below the
    /// minimum bet.
    pub fn adjust_amount(&mut self, delta: i64) {
        let magnitude = delta.unsigned_abs();
        self.amount = if delta >= 0 {
            self.amount.saturating_add(magnitude)
        } else {
            self.amount.saturating_sub(magnitude).max(self.min_bet)
        };
    }

    /// The "-" stepper.
    pub fn step_down(&mut self) {
        self.adjust_amount(-(CHIP_STEP as i64));
    }

    pub fn reset(&mut self) {
        self.amount = 0;
    }

    pub fn set_parity(&mut self, parity: Parity) {
        self.parity = Some(parity);
    }

    /// Check the wager can be submitted and copy it into a request.
    ///
    /// A missing parity is reported before a low amount.
    pub fn validate(&self) -> Result<PlayRequest, GameError> {
        let parity = self.parity.ok_or(GameError::SelectionRequired)?;
        if self.amount < self.min_bet {
            return Err(GameError::MinimumBet {
                amount: self.amount,
                minimum: self.min_bet,
            });
        }
        Ok(PlayRequest {
            bet_amount: self.amount,
            betting_type: parity,
        })
    }
}
