use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{NewUsageEntry, UsageLogEntry};

/// Append-only store of usage entries. Implementations must make `append`
/// atomic; the gateway adds no locking of its own.
#[async_trait]
pub trait UsageLedger: Send + Sync {
    async fn append(&self, entry: NewUsageEntry) -> anyhow::Result<UsageLogEntry>;

    async fn count(&self) -> anyhow::Result<i64>;
}

/// Process-local ledger for tests and offline tooling.
#[derive(Debug, Default)]
pub struct MemoryUsageLedger {
    entries: Mutex<Vec<UsageLogEntry>>,
}

impl MemoryUsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<UsageLogEntry> {
        self.entries.lock().await.clone()
    }
}

/// Row form of a new entry, stamped with id and insert time.
pub(crate) fn to_row(entry: &NewUsageEntry) -> anyhow::Result<UsageLogEntry> {
    Ok(UsageLogEntry {
        id: Uuid::new_v4(),
        endpoint: entry.endpoint.as_str().to_string(),
        model: entry.model.clone(),
        prompt_tokens: i32::try_from(entry.prompt_tokens)?,
        completion_tokens: i32::try_from(entry.completion_tokens)?,
        total_tokens: i32::try_from(entry.total_tokens())?,
        cost_estimate: entry.cost_estimate,
        session_id: entry.context.session_id(),
        mover_id: entry.context.mover_id(),
        created_at: Utc::now(),
    })
}

#[async_trait]
impl UsageLedger for MemoryUsageLedger {
    async fn append(&self, entry: NewUsageEntry) -> anyhow::Result<UsageLogEntry> {
        let row = to_row(&entry)?;
        self.entries.lock().await.push(row.clone());
        Ok(row)
    }

    async fn count(&self) -> anyhow::Result<i64> {
        Ok(self.entries.lock().await.len() as i64)
    }
}
