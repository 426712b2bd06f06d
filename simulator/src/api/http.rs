use axum::{
    extract::{rejection::JsonRejection, State as AxumState},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use oowee_types::{ErrorBody, PlayRequest};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{PlayError, Simulator};

#[derive(Serialize)]
struct HealthzResponse {
    ok: bool,
}

pub(super) async fn healthz() -> Response {
    Json(HealthzResponse { ok: true }).into_response()
}

/// Extract the credential from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn validation_failed(field: &str, reason: String) -> Response {
    let body = ErrorBody {
        error: "Validation Failed".to_string(),
        message: Some("invalid input".to_string()),
        details: Some(BTreeMap::from([(field.to_string(), reason)])),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

impl IntoResponse for PlayError {
    fn into_response(self) -> Response {
        match self {
            PlayError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody::new("Unauthorized", self.to_string())),
            )
                .into_response(),
            PlayError::BelowMinimum { .. } => validation_failed("betAmount", self.to_string()),
            PlayError::UnknownAccount | PlayError::InsufficientBalance { .. } => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new("Bad Request", self.to_string())),
            )
                .into_response(),
        }
    }
}

pub(super) async fn play_dice(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    headers: HeaderMap,
    request: Result<Json<PlayRequest>, JsonRejection>,
) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return PlayError::Unauthorized.into_response();
    };
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => {
            tracing::debug!(%rejection, "rejected dice request body");
            return validation_failed("body", rejection.body_text());
        }
    };

    let latency = simulator.latency();
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }

    match simulator.play(token, request) {
        Ok(response) => Json(response).into_response(),
        Err(err) => {
            tracing::warn!(%err, bet = request.bet_amount, "dice round refused");
            err.into_response()
        }
    }
}
