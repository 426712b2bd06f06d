use axum::{
    routing::{get, post},
    Router,
};
use oowee_types::DICE_PATH;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::Simulator;

mod http;

pub struct Api {
    simulator: Arc<Simulator>,
}

impl Api {
    pub fn new(simulator: Arc<Simulator>) -> Self {
        Self { simulator }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/healthz", get(http::healthz))
            .route(&format!("/{DICE_PATH}"), post(http::play_dice))
            .layer(TraceLayer::new_for_http())
            .with_state(self.simulator.clone())
    }
}
