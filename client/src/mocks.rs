//! Scriptable [Gateway] for exercising the round state machine without a server.

use crate::{Error, Gateway, Result};
use oowee_types::{PlayRequest, PlayResponse};
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Clone, Debug)]
pub enum MockReply {
    Respond(PlayResponse),
    Reject {
        status: StatusCode,
        message: Option<String>,
    },
    /// The server could not be reached.
    Unreachable,
}

impl MockReply {
    pub fn outcome(win: bool, dice_number: u8, current_balance: u64) -> Self {
        MockReply::Respond(PlayResponse {
            win,
            dice_number,
            current_balance,
            result: None,
            earned_amount: None,
            message: None,
        })
    }

    pub fn rejected(message: &str) -> Self {
        MockReply::Reject {
            status: StatusCode::BAD_REQUEST,
            message: Some(message.to_string()),
        }
    }

    fn into_result(self) -> Result<PlayResponse> {
        match self {
            MockReply::Respond(response) => Ok(response),
            MockReply::Reject { status, message } => Err(Error::Rejected {
                status,
                error: "Bad Request".to_string(),
                message,
            }),
            MockReply::Unreachable => Err(Error::Failed(StatusCode::SERVICE_UNAVAILABLE)),
        }
    }
}

/// Replies after a fixed latency and records every request it receives.
///
/// Scripted replies are consumed in order; once they run out every request
/// gets the fallback.
pub struct MockGateway {
    script: Mutex<VecDeque<(Duration, MockReply)>>,
    fallback: (Duration, MockReply),
    requests: Mutex<Vec<PlayRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockGateway {
    pub fn new(latency: Duration, reply: MockReply) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: (latency, reply),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_scripted(self, latency: Duration, reply: MockReply) -> Self {
        lock(&self.script).push_back((latency, reply));
        self
    }

    pub fn requests(&self) -> Vec<PlayRequest> {
        lock(&self.requests).clone()
    }
}

impl Gateway for MockGateway {
    fn roll(&self, request: PlayRequest) -> impl Future<Output = Result<PlayResponse>> + Send {
        lock(&self.requests).push(request);
        let (latency, reply) = lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        async move {
            tokio::time::sleep(latency).await;
            reply.into_result()
        }
    }
}
