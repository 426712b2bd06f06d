//! JSON bodies exchanged with `POST /api/games/dice`.

use crate::game::Parity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Path of the dice endpoint, relative to the server base URL.
pub const DICE_PATH: &str = "api/games/dice";

/// A wager as submitted to the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayRequest {
    pub bet_amount: u64,
    pub betting_type: Parity,
}

/// The server's verdict on a wager.
///
/// Only `win`, `dice_number` and `current_balance` are required; the rest
/// is informational and defaults when a server omits it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayResponse {
    pub win: bool,
    pub dice_number: u8,
    pub current_balance: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Parity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earned_amount: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Error body returned with any non-2xx status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_uses_server_field_names() {
        let request = PlayRequest {
            bet_amount: 1_000,
            betting_type: Parity::Odd,
        };
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({ "betAmount": 1000, "bettingType": "ODD" })
        );
    }

    #[test]
    fn response_accepts_minimal_body() {
        let body = json!({ "win": true, "diceNumber": 3, "currentBalance": 5000 });
        let response: PlayResponse = serde_json::from_value(body).unwrap();
        assert!(response.win);
        assert_eq!(response.dice_number, 3);
        assert_eq!(response.current_balance, 5_000);
        assert_eq!(response.result, None);
        assert_eq!(response.message, None);
    }

    #[test]
    fn response_keeps_informational_fields() {
        let body = json!({
            "win": false,
            "diceNumber": 4,
            "currentBalance": 0,
            "result": "EVEN",
            "earnedAmount": 0,
            "message": "better luck next time",
        });
        let response: PlayResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.result, Some(Parity::Even));
        assert_eq!(response.earned_amount, Some(0));
        assert_eq!(response.message.as_deref(), Some("better luck next time"));
    }

    #[test]
    fn error_body_without_message() {
        let body: ErrorBody =
            serde_json::from_value(json!({ "error": "Internal Server Error" })).unwrap();
        assert_eq!(body.error, "Internal Server Error");
        assert!(body.message.is_none());
        assert!(body.details.is_none());
    }
}
