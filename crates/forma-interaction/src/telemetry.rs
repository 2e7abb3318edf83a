//! Fire-and-forget turn logging to an optional webhook sink.
//!
//! Telemetry is a side channel: posts are spawned off the turn pipeline with
//! a short timeout and every failure is swallowed. When no webhook URL is
//! configured the sink does not exist and logging is disabled entirely.

use reqwest::Client;
use serde::Serialize;
use std::env;
use std::time::Duration;

use forma_core::error::{FormaError, Result};
use forma_core::transcript::Role;

const WEBHOOK_URL_ENV: &str = "FORMA_LOG_WEBHOOK_URL";
const POST_TIMEOUT: Duration = Duration::from_secs(3);

/// One outbound telemetry record per appended turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnRecord {
    pub timestamp_utc: String,
    pub session_id: String,
    pub role: Role,
    pub message: String,
}

impl TurnRecord {
    /// Creates a record stamped with the current UTC time.
    pub fn now(session_id: impl Into<String>, role: Role, message: impl Into<String>) -> Self {
        Self {
            timestamp_utc: chrono::Utc::now().to_rfc3339(),
            session_id: session_id.into(),
            role,
            message: message.into(),
        }
    }
}

/// Best-effort webhook sink for turn records.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// Builds the sink from `FORMA_LOG_WEBHOOK_URL`. Returns `None` when the
    /// variable is unset or empty; telemetry is then disabled entirely.
    pub fn from_env() -> Option<Self> {
        match env::var(WEBHOOK_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Some(Self::new(url)),
            _ => None,
        }
    }

    /// Posts the record on a detached task. Never blocks the turn pipeline
    /// and never propagates a failure into session state.
    pub fn record(&self, record: TurnRecord) {
        let sink = self.clone();
        tokio::spawn(async move {
            if let Err(err) = sink.post(&record).await {
                tracing::debug!("Telemetry record dropped: {err}");
            }
        });
    }

    async fn post(&self, record: &TurnRecord) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .timeout(POST_TIMEOUT)
            .json(record)
            .send()
            .await
            .map_err(|err| FormaError::Telemetry(err.to_string()))?;

        if !response.status().is_success() {
            return Err(FormaError::Telemetry(format!(
                "webhook returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
