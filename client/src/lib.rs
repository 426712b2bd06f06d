pub mod client;
pub mod config;
pub mod game;
pub mod gateway;
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use client::Client;
pub use config::{Config, GameConfig};
pub use game::{
    DiceGame, GameError, GameView, Outcome, Phase, RoundId, RoundTicket, TickerMode, Wager,
};
pub use gateway::Gateway;
use thiserror::Error;

/// Error type for client operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("failed: {0}")]
    Failed(reqwest::StatusCode),
    #[error("rejected: {status}: {error}")]
    Rejected {
        status: reqwest::StatusCode,
        error: String,
        message: Option<String>,
    },
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid URL scheme: {0} (expected http or https)")]
    InvalidScheme(String),
}

impl Error {
    /// Human-readable reason supplied by the server, if it sent one.
    pub fn message(&self) -> Option<String> {
        match self {
            Error::Rejected { message, .. } => message.clone(),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use oowee_simulator::{Api, Simulator, SimulatorConfig};
    use oowee_types::{Parity, PlayRequest};
    use std::{net::SocketAddr, sync::Arc, time::Duration};

    struct TestContext {
        simulator: Arc<Simulator>,
        base_url: String,
        server_handle: tokio::task::JoinHandle<()>,
    }

    impl TestContext {
        async fn new() -> Self {
            let mut config = SimulatorConfig {
                seed: Some(11),
                ..Default::default()
            };
            config.accounts.insert("alice".to_string(), 10_000);
            let simulator = Arc::new(Simulator::new(config));
            let router = Api::new(simulator.clone()).router();

            // Start server on random port
            let addr = SocketAddr::from(([127, 0, 0, 1], 0));
            let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
            let actual_addr = listener.local_addr().unwrap();
            let base_url = format!("http://{actual_addr}");

            let server_handle = tokio::spawn(async move {
                axum::serve(listener, router).await.unwrap();
            });

            Self {
                simulator,
                base_url,
                server_handle,
            }
        }

        fn create_client(&self) -> Client {
            Client::new(&self.base_url).unwrap().with_token("alice")
        }
    }

    impl Drop for TestContext {
        fn drop(&mut self) {
            self.server_handle.abort();
        }
    }

    #[tokio::test]
    async fn test_client_plays_dice() {
        let ctx = TestContext::new().await;
        let client = ctx.create_client();

        let response = client
            .play_dice(&PlayRequest {
                bet_amount: 1_000,
                betting_type: Parity::Odd,
            })
            .await
            .unwrap();
        assert!(oowee_types::is_valid_face(response.dice_number));
        assert_eq!(Some(response.current_balance), ctx.simulator.balance("alice"));
        assert_eq!(response.result, Some(Parity::of(response.dice_number)));
    }

    #[tokio::test]
    async fn test_client_without_token_is_rejected() {
        let ctx = TestContext::new().await;
        let client = Client::new(&ctx.base_url).unwrap();

        let err = client
            .play_dice(&PlayRequest {
                bet_amount: 1_000,
                betting_type: Parity::Even,
            })
            .await
            .unwrap_err();
        match err {
            Error::Rejected { status, .. } => {
                assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED)
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(ctx.simulator.balance("alice"), Some(10_000));
    }

    #[tokio::test]
    async fn test_client_surfaces_server_message() {
        let ctx = TestContext::new().await;
        let client = ctx.create_client();

        let err = client
            .play_dice(&PlayRequest {
                bet_amount: 50_000,
                betting_type: Parity::Even,
            })
            .await
            .unwrap_err();
        let message = err.message().expect("server sends a message");
        assert!(message.contains("insufficient points"), "{message}");
    }

    #[tokio::test]
    async fn test_client_unreachable_server() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::new(&format!("http://{addr}")).unwrap();
        let err = client
            .play_dice(&PlayRequest {
                bet_amount: 1_000,
                betting_type: Parity::Odd,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Reqwest(_)));
        assert!(err.message().is_none());
    }

    #[test]
    fn test_client_rejects_non_http_scheme() {
        assert!(matches!(
            Client::new("ftp://localhost:8080"),
            Err(Error::InvalidScheme(scheme)) if scheme == "ftp"
        ));
        assert!(matches!(Client::new("not a url"), Err(Error::Url(_))));
    }

    #[tokio::test]
    async fn test_game_round_against_simulator() {
        let ctx = TestContext::new().await;
        let config = GameConfig {
            min_round_ms: 50,
            ..Default::default()
        };
        let game = DiceGame::new(ctx.create_client(), config);
        game.set_amount(2_000).unwrap();
        game.set_parity(Parity::Even).unwrap();

        let ticket = game.submit().unwrap();
        let outcome = tokio::time::timeout(Duration::from_secs(5), ticket.wait())
            .await
            .expect("round should resolve")
            .unwrap();

        assert_eq!(outcome.played_bet_amount, 2_000);
        assert_eq!(outcome.win, Parity::of(outcome.dice_number) == Parity::Even);
        assert_eq!(Some(outcome.current_balance), ctx.simulator.balance("alice"));
        let view = game.view();
        assert_eq!(view.phase, Phase::Resolved);
        assert_eq!(view.face, outcome.dice_number);
    }

    #[tokio::test]
    async fn test_game_reports_server_refusal() {
        let ctx = TestContext::new().await;
        let config = GameConfig {
            min_round_ms: 50,
            ..Default::default()
        };
        let game = DiceGame::new(ctx.create_client(), config);
        game.set_amount(90_000).unwrap();
        game.set_parity(Parity::Odd).unwrap();

        let err = game.submit().unwrap().wait().await.unwrap_err();
        match err {
            GameError::Transient { message } => {
                assert!(message.unwrap().contains("insufficient points"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let view = game.view();
        assert_eq!(view.phase, Phase::Idle);
        assert_eq!(view.wager.amount(), 90_000);
        assert_eq!(view.wager.parity(), Some(Parity::Odd));
    }
}
