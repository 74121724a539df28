use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/generate";

/// Shown when the backend answered successfully but without a usable `scenario`.
pub const NO_SCENARIO: &str = "No scenario generated.";

const PING_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Serialize)]
struct GenerateRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct MessageBody {
    message: Option<String>,
}

/// Everything that can go wrong between sending an idea and reading a scenario.
///
/// The UI shows one message for all of these; the variants only exist so the
/// log says which one happened.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("request to generation endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generation endpoint returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("could not decode generation response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("generation task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Clone)]
pub struct ScenarioClient {
    client: Client,
    endpoint: Url,
}

impl ScenarioClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| anyhow!("Invalid generation endpoint {:?}: {}", endpoint, e))?;

        // A local backend is never reached through a proxy
        let client = if is_loopback(&endpoint) {
            Client::builder().no_proxy().build()?
        } else {
            Client::new()
        };

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends one idea and returns the scenario text, or [`NO_SCENARIO`] when
    /// the response carries no usable `scenario` field.
    pub async fn generate(&self, idea: &str) -> Result<String, GenerateError> {
        let request = GenerateRequest { text: idea };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GenerateError::Status {
                status,
                message: error_message(&body),
            });
        }

        let body: Value = serde_json::from_str(&body)?;
        let scenario = scenario_from(&body);
        debug!(chars = scenario.chars().count(), "scenario received");
        Ok(scenario)
    }

    /// Health check against `/ping` on the endpoint's origin.
    pub async fn ping(&self) -> Result<()> {
        let url = self.endpoint.join("/ping")?;

        let response = self
            .client
            .get(url)
            .timeout(PING_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("Ping failed with status: {}", response.status()));
        }

        let body: MessageBody = response.json().await?;
        match body.message.as_deref() {
            Some("pong") => Ok(()),
            other => {
                warn!(message = ?other, "unexpected ping reply");
                Err(anyhow!("Unexpected ping reply: {:?}", other))
            }
        }
    }
}

fn is_loopback(url: &Url) -> bool {
    matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"))
}

fn scenario_from(body: &Value) -> String {
    body.get("scenario")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| NO_SCENARIO.to_string())
}

// Backend errors look like {"message": "..."}; anything else is logged raw.
fn error_message(body: &str) -> String {
    serde_json::from_str::<MessageBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.trim().to_string())
}
