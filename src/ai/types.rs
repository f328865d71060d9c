use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Sentiment;

/// Token accounting for one completion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn new(model: impl Into<String>, prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            model: model.into(),
            prompt_tokens,
            completion_tokens,
        }
    }

    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

/// A decoded capability result together with what it cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion<T> {
    pub output: T,
    pub usage: TokenUsage,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// A clarification question the user already answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationAnswer {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLink {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Research answer: short summary, markdown analysis, curated reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchResult {
    pub summary: String,
    #[serde(default)]
    pub analysis: String,
    #[serde(default)]
    pub links: Vec<ResourceLink>,
}

/// What the analyst is told about a mover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockContext {
    pub symbol: String,
    #[serde(default)]
    pub company_name: Option<String>,
    pub headline: String,
    #[serde(default)]
    pub news_source: Option<String>,
    #[serde(default)]
    pub movement_percent: Option<Decimal>,
}

impl StockContext {
    pub fn new(symbol: impl Into<String>, headline: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            company_name: None,
            headline: headline.into(),
            news_source: None,
            movement_percent: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAnalysis {
    /// Whether the catalyst reads as a genuine trading opportunity.
    pub valid: bool,
    pub analysis: String,
    pub sentiment: Sentiment,
}
