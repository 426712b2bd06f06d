use oowee_types::{is_valid_face, PlayRequest, PlayResponse};
use std::fmt;
use tokio::sync::oneshot;
use tokio::time::Instant;

use super::GameError;

/// Identity of one submission. A response carrying a stale id is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoundId(pub(crate) u64);

impl RoundId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InFlight,
    Resolved,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::InFlight => "in_flight",
            Phase::Resolved => "resolved",
        }
    }
}

/// Result of a resolved round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub win: bool,
    pub dice_number: u8,
    pub current_balance: u64,
    /// Amount wagered at submission, independent of later edits.
    pub played_bet_amount: u64,
}

impl Outcome {
    /// Merge a server response with the locally recorded stake. Returns
    /// `None` when the face is not a die face.
    pub(crate) fn from_response(response: &PlayResponse, played_bet_amount: u64) -> Option<Self> {
        if !is_valid_face(response.dice_number) {
            return None;
        }
        Some(Self {
            win: response.win,
            dice_number: response.dice_number,
            current_balance: response.current_balance,
            played_bet_amount,
        })
    }

    /// Signed change shown with the result: the stake gained or lost.
    pub fn net_change(&self) -> i64 {
        let stake = i64::try_from(self.played_bet_amount).unwrap_or(i64::MAX);
        if self.win {
            stake
        } else {
            -stake
        }
    }
}

pub(crate) type Report = Result<Outcome, GameError>;

pub(crate) enum Round {
    Idle,
    InFlight {
        id: RoundId,
        request: PlayRequest,
        started: Instant,
        reporter: oneshot::Sender<Report>,
    },
    Resolved {
        id: RoundId,
        outcome: Outcome,
    },
}

impl Round {
    pub(crate) fn phase(&self) -> Phase {
        match self {
            Round::Idle => Phase::Idle,
            Round::InFlight { .. } => Phase::InFlight,
            Round::Resolved { .. } => Phase::Resolved,
        }
    }

    pub(crate) fn id(&self) -> Option<RoundId> {
        match self {
            Round::Idle => None,
            Round::InFlight { id, .. } | Round::Resolved { id, .. } => Some(*id),
        }
    }

    pub(crate) fn outcome(&self) -> Option<Outcome> {
        match self {
            Round::Resolved { outcome, .. } => Some(*outcome),
            _ => None,
        }
    }

    pub(crate) fn is_in_flight(&self) -> bool {
        matches!(self, Round::InFlight { .. })
    }
}

/// Handle to a submitted round.
#[derive(Debug)]
pub struct RoundTicket {
    pub(crate) id: RoundId,
    pub(crate) receiver: oneshot::Receiver<Report>,
}

impl RoundTicket {
    pub fn id(&self) -> RoundId {
        self.id
    }

    /// Wait for the round to resolve or fail. A round abandoned before its
    /// response arrived yields [GameError::Abandoned].
    pub async fn wait(self) -> Result<Outcome, GameError> {
        self.receiver.await.unwrap_or(Err(GameError::Abandoned))
    }
}
