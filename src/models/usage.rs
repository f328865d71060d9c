use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Which capability produced a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Clarify,
    Respond,
    Validate,
    Analyze,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [
        Endpoint::Clarify,
        Endpoint::Respond,
        Endpoint::Validate,
        Endpoint::Analyze,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Clarify => "clarify",
            Endpoint::Respond => "respond",
            Endpoint::Validate => "validate",
            Endpoint::Analyze => "analyze",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a ledger entry is attributed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageContext {
    #[default]
    Unlinked,
    Session(Uuid),
    Mover(Uuid),
}

impl UsageContext {
    pub fn session_id(&self) -> Option<Uuid> {
        match self {
            UsageContext::Session(id) => Some(*id),
            _ => None,
        }
    }

    pub fn mover_id(&self) -> Option<Uuid> {
        match self {
            UsageContext::Mover(id) => Some(*id),
            _ => None,
        }
    }
}

/// Database row for usage_log table. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UsageLogEntry {
    pub id: Uuid,
    pub endpoint: String,
    pub model: String,
    pub prompt_tokens: i32,
    pub completion_tokens: i32,
    pub total_tokens: i32,
    pub cost_estimate: Decimal,
    pub session_id: Option<Uuid>,
    pub mover_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the usage ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUsageEntry {
    pub endpoint: Endpoint,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub cost_estimate: Decimal,
    pub context: UsageContext,
}

impl NewUsageEntry {
    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

/// Aggregated spend per model.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ModelUsageTotal {
    pub model: String,
    pub calls: i64,
    pub total_tokens: i64,
    pub total_cost: Decimal,
}
