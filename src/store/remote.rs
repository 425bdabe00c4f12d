//! HTTP storage backend talking to a `filament-tracker serve` instance.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

use super::backend::SpoolStore;
use crate::error::{Result, TrackerError};
use crate::model::{validate_weight, NewSpool, NewUsageLog, Spool, SpoolId, UsageLog};
use crate::wire::{ApiLog, ApiSpool, CreatedResponse, SuccessResponse};

/// Remote backend configuration
#[derive(Clone, Debug)]
pub struct RemoteConfig {
    /// Server root, e.g. `http://nas.local:8082`
    pub base_url: String,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Spool store that forwards every operation to the server's JSON API.
///
/// The server owns weight bookkeeping: appending a log makes it add the
/// change to the stored weight, so the caller's resulting weight is not
/// sent and a bare weight override is not supported.
pub struct RemoteStore {
    client: Client,
    base_url: String,
}

impl RemoteStore {
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn post_log(&self, log: &NewUsageLog) -> Result<()> {
        log.validate()?;
        let response = self
            .client
            .post(self.url("/logs"))
            .json(&ApiLog::from(log))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(TrackerError::SpoolNotFound(log.spool_id));
        }
        let _: SuccessResponse = ensure_success(response).await?.json().await?;
        Ok(())
    }
}

/// Turn a non-success response into an error carrying the server's message
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(TrackerError::Remote {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl SpoolStore for RemoteStore {
    async fn list_spools(&self) -> Result<Vec<Spool>> {
        let response = self.client.get(self.url("/filaments")).send().await?;
        let spools: Vec<ApiSpool> = ensure_success(response).await?.json().await?;
        spools.into_iter().map(Spool::try_from).collect()
    }

    async fn get_spool(&self, id: SpoolId) -> Result<Option<Spool>> {
        let response = self
            .client
            .get(self.url(&format!("/filaments/{}", id)))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let spool: ApiSpool = ensure_success(response).await?.json().await?;
        Spool::try_from(spool).map(Some)
    }

    async fn add_spool(&self, spool: NewSpool) -> Result<SpoolId> {
        spool.validate()?;
        let response = self
            .client
            .post(self.url("/filaments"))
            .json(&ApiSpool::from(&spool))
            .send()
            .await?;
        let created: CreatedResponse = ensure_success(response).await?.json().await?;
        Ok(created.id)
    }

    async fn delete_spool(&self, id: SpoolId) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/filaments/{}", id)))
            .send()
            .await?;
        let _: SuccessResponse = ensure_success(response).await?.json().await?;
        Ok(())
    }

    async fn list_logs(&self, spool_id: SpoolId) -> Result<Vec<UsageLog>> {
        let response = self
            .client
            .get(self.url(&format!("/logs/{}", spool_id)))
            .send()
            .await?;
        let logs: Vec<ApiLog> = ensure_success(response).await?.json().await?;
        logs.into_iter().map(UsageLog::try_from).collect()
    }

    async fn append_log(&self, log: NewUsageLog, resulting_weight: f64) -> Result<()> {
        tracing::debug!(
            "Appending {:+}g to spool {} (server recomputes weight, local estimate {}g)",
            log.change_amount,
            log.spool_id,
            resulting_weight
        );
        self.post_log(&log).await
    }

    /// The server applies the change; the returned weight is read back from it.
    async fn record_change(&self, log: NewUsageLog) -> Result<f64> {
        let id = log.spool_id;
        self.post_log(&log).await?;
        self.get_spool(id)
            .await?
            .map(|spool| spool.weight)
            .ok_or(TrackerError::SpoolNotFound(id))
    }

    async fn set_spool_weight(&self, id: SpoolId, weight: f64) -> Result<()> {
        validate_weight(weight)?;
        tracing::warn!(
            "Direct weight override ({}g for spool {}) is not supported by the remote backend; ignored",
            weight,
            id
        );
        Ok(())
    }
}
