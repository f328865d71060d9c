use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

use crate::market::MarketSnapshot;

// ---------------------------------------------------------------------------
// MoverStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoverStatus {
    Identified,
    Researching,
    Ready,
    Executed,
    Passed,
}

impl MoverStatus {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "identified" => Some(MoverStatus::Identified),
            "researching" => Some(MoverStatus::Researching),
            "ready" => Some(MoverStatus::Ready),
            "executed" => Some(MoverStatus::Executed),
            "passed" => Some(MoverStatus::Passed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoverStatus::Identified => "identified",
            MoverStatus::Researching => "researching",
            MoverStatus::Ready => "ready",
            MoverStatus::Executed => "executed",
            MoverStatus::Passed => "passed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MoverStatus::Executed | MoverStatus::Passed)
    }

    /// Executed and Passed share the final rank: one cannot follow the other.
    fn rank(&self) -> u8 {
        match self {
            MoverStatus::Identified => 0,
            MoverStatus::Researching => 1,
            MoverStatus::Ready => 2,
            MoverStatus::Executed | MoverStatus::Passed => 3,
        }
    }

    /// Forward-only lifecycle. Staying in the current state is allowed.
    pub fn can_transition_to(&self, next: MoverStatus) -> bool {
        if *self == next {
            return true;
        }
        !self.is_terminal() && next.rank() > self.rank()
    }
}

impl fmt::Display for MoverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Sentiment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "bullish" => Some(Sentiment::Bullish),
            "bearish" => Some(Sentiment::Bearish),
            "neutral" => Some(Sentiment::Neutral),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "bullish",
            Sentiment::Bearish => "bearish",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TrackedMover
// ---------------------------------------------------------------------------

/// Database row for tracked_movers table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrackedMover {
    pub id: Uuid,
    pub symbol: String,
    pub company_name: Option<String>,
    pub news_headline: Option<String>,
    pub news_source: Option<String>,
    pub news_url: Option<String>,
    pub movement_percent: Option<Decimal>,
    pub pre_market_price: Option<Decimal>,
    pub pre_market_volume: Option<i64>,
    pub average_volume: Option<i64>,
    pub relative_volume_ratio: Option<Decimal>,
    pub spread_percent: Option<Decimal>,
    pub ai_analysis: Option<String>,
    pub sentiment: Option<String>,
    pub strategy_notes: Option<String>,
    pub entry_price: Option<Decimal>,
    pub exit_price: Option<Decimal>,
    pub profit_loss: Option<Decimal>,
    pub status: String,
    pub trade_date: NaiveDate,
    pub identified_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
}

impl TrackedMover {
    /// Unknown status strings read as `Identified`; the column is constrained
    /// by the schema so this only matters for hand-edited rows.
    pub fn status(&self) -> MoverStatus {
        MoverStatus::from_db_str(&self.status).unwrap_or(MoverStatus::Identified)
    }

    pub fn sentiment(&self) -> Option<Sentiment> {
        self.sentiment.as_deref().and_then(Sentiment::from_api_str)
    }

    /// True when the headline is a scanner placeholder rather than real news.
    pub fn needs_catalyst(&self) -> bool {
        match self.news_headline.as_deref() {
            None => true,
            Some(h) => {
                let lower = h.to_lowercase();
                h.trim().is_empty()
                    || lower.contains("pre-market movement")
                    || lower.contains("price movement")
            }
        }
    }
}

/// News item attached to a mover as its catalyst.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalyst {
    pub headline: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Insert payload for a new mover. Derived metrics are computed here, never
/// supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrackedMover {
    pub symbol: String,
    pub company_name: Option<String>,
    pub news_headline: Option<String>,
    pub news_source: Option<String>,
    pub news_url: Option<String>,
    pub movement_percent: Option<Decimal>,
    pub pre_market_price: Option<Decimal>,
    pub pre_market_volume: Option<i64>,
    pub average_volume: Option<i64>,
    pub relative_volume_ratio: Option<Decimal>,
    pub spread_percent: Option<Decimal>,
}

impl NewTrackedMover {
    /// Manual entry: symbol plus whatever the user typed in.
    pub fn manual(symbol: &str, catalyst: Option<Catalyst>, movement_percent: Option<Decimal>) -> Self {
        let catalyst = catalyst.unwrap_or_default();
        Self {
            symbol: symbol.trim().to_uppercase(),
            company_name: None,
            news_headline: Some(catalyst.headline).filter(|h| !h.trim().is_empty()),
            news_source: catalyst.source,
            news_url: catalyst.url,
            movement_percent,
            pre_market_price: None,
            pre_market_volume: None,
            average_volume: None,
            relative_volume_ratio: None,
            spread_percent: None,
        }
    }

    /// Scanner entry: raw snapshot, derived metrics attached. Without a
    /// catalyst the headline becomes a placeholder describing the move.
    pub fn from_snapshot(snapshot: &MarketSnapshot, catalyst: Option<Catalyst>) -> Self {
        let derived = snapshot.derive();

        let (headline, source, url) = match catalyst {
            Some(c) => (Some(c.headline), c.source, c.url),
            None => (
                derived
                    .change_percent
                    .map(|p| format!("Pre-market movement: {}", crate::market::format::format_percent(Some(p)))),
                None,
                None,
            ),
        };

        Self {
            symbol: snapshot.symbol.trim().to_uppercase(),
            company_name: snapshot.company_name.clone().filter(|n| !n.is_empty()),
            news_headline: headline,
            news_source: source,
            news_url: url,
            movement_percent: derived.change_percent.map(|p| p.round_dp(2)),
            pre_market_price: snapshot.display_price(),
            pre_market_volume: snapshot.pre_market_volume,
            average_volume: snapshot.average_volume,
            relative_volume_ratio: derived.relative_volume_ratio,
            spread_percent: derived.spread_percent,
        }
    }
}
