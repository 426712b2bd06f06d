use serde::{Deserialize, Serialize};
use std::{fmt, ops::RangeInclusive, str::FromStr};
use thiserror::Error;

/// Smallest wager (in points) the server accepts.
pub const MIN_BET: u64 = 100;

/// Amount added or removed by the +/- steppers.
pub const CHIP_STEP: u64 = 1_000;

/// Quick-add chips offered next to the steppers.
pub const CHIP_PRESETS: [u64; 3] = [1_000, 5_000, 10_000];

/// Amount the dice screen starts with.
pub const DEFAULT_BET: u64 = 1_000;

/// Faces of a six-sided die.
pub const FACES: RangeInclusive<u8> = 1..=6;

pub fn is_valid_face(face: u8) -> bool {
    FACES.contains(&face)
}

/// Points credited back after a round. The stake is debited before the roll,
/// so a win returns twice the stake and a loss returns nothing.
pub fn payout(bet: u64, win: bool) -> u64 {
    if win {
        bet.saturating_mul(2)
    } else {
        0
    }
}

/// The player's call on the revealed face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Parity {
    Odd,
    Even,
}

impl Parity {
    pub fn of(face: u8) -> Self {
        if face % 2 == 0 {
            Parity::Even
        } else {
            Parity::Odd
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Parity::Odd => "ODD",
            Parity::Even => "EVEN",
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown parity {0:?} (expected odd or even)")]
pub struct ParseParityError(pub String);

impl FromStr for Parity {
    type Err = ParseParityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "odd" => Ok(Parity::Odd),
            "even" => Ok(Parity::Even),
            _ => Err(ParseParityError(s.to_string())),
        }
    }
}
