//! Destinations for finished timer runs.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::models::{SessionDraft, Subject};
use crate::models::timestamp::format_timestamp;
use crate::services::{LedgerService, RecordSessionInput};

#[async_trait]
pub trait SessionSink: Send + Sync {
    async fn deliver(&self, draft: SessionDraft) -> Result<()>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionBody {
    subject_id: i32,
    start_time: String,
    end_time: String,
    duration: i64,
}

impl From<SessionDraft> for CreateSessionBody {
    fn from(draft: SessionDraft) -> Self {
        Self {
            subject_id: draft.subject_id,
            start_time: format_timestamp(draft.start_time),
            end_time: format_timestamp(draft.end_time),
            duration: draft.duration_seconds,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    error: Option<String>,
}

/// Posts sessions to a running server's `/api/sessions`.
pub struct HttpSessionSink {
    client: Client,
    base: Url,
    endpoint: Url,
    token: String,
}

impl HttpSessionSink {
    pub fn new(server_url: &str, token: String) -> Result<Self> {
        let base = Url::parse(server_url)
            .with_context(|| format!("Invalid server URL: {server_url}"))?;
        let endpoint = base
            .join("/api/sessions")
            .with_context(|| format!("Invalid server URL: {server_url}"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("focusledger/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base,
            endpoint,
            token,
        })
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The token owner's subjects, used to resolve a subject given by name.
    pub async fn subjects(&self) -> Result<Vec<Subject>> {
        let url = self.base.join("/api/subjects")?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .context("Failed to reach server")?;

        let status = response.status();
        let envelope: Envelope<Vec<Subject>> = response
            .json()
            .await
            .with_context(|| format!("Unexpected response from server ({status})"))?;

        match envelope {
            Envelope { data: Some(subjects), .. } => Ok(subjects),
            Envelope { error, .. } => anyhow::bail!(
                "Failed to list subjects ({status}): {}",
                error.unwrap_or_default()
            ),
        }
    }
}

#[async_trait]
impl SessionSink for HttpSessionSink {
    async fn deliver(&self, draft: SessionDraft) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(&CreateSessionBody::from(draft))
            .send()
            .await
            .context("Failed to reach server")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Server rejected session ({status}): {body}");
        }

        debug!(endpoint = %self.endpoint, "Session delivered");
        Ok(())
    }
}

/// Writes straight into the ledger on behalf of a local user.
pub struct StoreSessionSink {
    ledger: Arc<dyn LedgerService>,
    user_id: i32,
}

impl StoreSessionSink {
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerService>, user_id: i32) -> Self {
        Self { ledger, user_id }
    }
}

#[async_trait]
impl SessionSink for StoreSessionSink {
    async fn deliver(&self, draft: SessionDraft) -> Result<()> {
        let session = draft.into_new_session();
        let input = RecordSessionInput {
            subject_id: Some(session.subject_id),
            start_time: Some(session.start_time),
            end_time: Some(session.end_time),
            duration: Some(session.duration),
            notes: session.notes,
        };

        let recorded = self
            .ledger
            .record(self.user_id, input)
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))?;

        debug!(session_id = recorded.id, "Session stored");
        Ok(())
    }
}
