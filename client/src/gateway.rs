use crate::{Client, Result};
use oowee_types::{PlayRequest, PlayResponse};
use std::future::Future;

/// Source of authoritative round outcomes.
///
/// The round state machine only ever issues one request per round through
/// this trait; authentication is expected to be handled by the implementor.
pub trait Gateway: Send + Sync + 'static {
    fn roll(&self, request: PlayRequest) -> impl Future<Output = Result<PlayResponse>> + Send;
}

impl Gateway for Client {
    fn roll(&self, request: PlayRequest) -> impl Future<Output = Result<PlayResponse>> + Send {
        async move { self.play_dice(&request).await }
    }
}
