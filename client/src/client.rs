use crate::{Error, Result};
use oowee_types::{api::DICE_PATH, ErrorBody, PlayRequest, PlayResponse};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the game server.
///
/// Credentials come from the authentication flow; this client only attaches
/// them as a bearer token.
#[derive(Clone)]
pub struct Client {
    pub base_url: Url,
    pub http_client: reqwest::Client,
    token: Option<String>,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        match base_url.scheme() {
            "http" | "https" => {}
            other => return Err(Error::InvalidScheme(other.to_string())),
        }
        // Keep any path prefix when joining endpoint paths.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url,
            http_client,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Submit a wager and return the server's verdict.
    pub async fn play_dice(&self, request: &PlayRequest) -> Result<PlayResponse> {
        let url = self.base_url.join(DICE_PATH)?;
        let mut builder = self.http_client.post(url).json(request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ErrorBody>(&body) {
                Ok(body) => {
                    debug!(%status, error = %body.error, "server rejected wager");
                    Error::Rejected {
                        status,
                        error: body.error,
                        message: body.message,
                    }
                }
                Err(_) => {
                    warn!(%status, len = body.len(), "unrecognized error body");
                    Error::Failed(status)
                }
            });
        }

        Ok(response.json::<PlayResponse>().await?)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("has_token", &self.token.is_some())
            .finish()
    }
}
