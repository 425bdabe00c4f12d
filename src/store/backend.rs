//! Data-access contract shared by every storage backend.

use async_trait::async_trait;

use crate::error::{Result, TrackerError};
use crate::model::{NewSpool, NewUsageLog, Spool, SpoolId, UsageLog};

/// Spool and usage-log operations, independent of where the data lives.
///
/// Implementations must be observably equivalent: the same sequence of
/// calls yields the same spools, ids and histories on every backend.
#[async_trait]
pub trait SpoolStore: Send + Sync {
    /// All spools, in a stable implementation-defined order
    async fn list_spools(&self) -> Result<Vec<Spool>>;

    /// A single spool; `Ok(None)` when the id does not exist
    async fn get_spool(&self, id: SpoolId) -> Result<Option<Spool>>;

    /// Validate and insert a spool, returning its new id
    async fn add_spool(&self, spool: NewSpool) -> Result<SpoolId>;

    /// Remove a spool together with its logs. Unknown ids are not an error.
    async fn delete_spool(&self, id: SpoolId) -> Result<()>;

    /// History of a spool, most recent first
    async fn list_logs(&self, spool_id: SpoolId) -> Result<Vec<UsageLog>>;

    /// Insert the log and set the spool's weight to `resulting_weight`.
    ///
    /// Both writes become visible together or not at all.
    async fn append_log(&self, log: NewUsageLog, resulting_weight: f64) -> Result<()>;

    /// Overwrite a spool's weight without recording a log entry
    async fn set_spool_weight(&self, id: SpoolId, weight: f64) -> Result<()>;

    /// Apply a weight change to a spool and record it, returning the new weight.
    ///
    /// The default reads then writes; backends that can add the change
    /// atomically override it.
    async fn record_change(&self, log: NewUsageLog) -> Result<f64> {
        log.validate()?;
        let spool = self
            .get_spool(log.spool_id)
            .await?
            .ok_or(TrackerError::SpoolNotFound(log.spool_id))?;
        let resulting_weight = spool.weight + log.change_amount;
        self.append_log(log, resulting_weight).await?;
        Ok(resulting_weight)
    }
}
