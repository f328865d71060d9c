use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;
use crate::models::Sentiment;

use super::types::{
    ClarificationAnswer, Completion, ResearchResult, StockAnalysis, StockContext, TokenUsage,
};

pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Higher-capability model for research answers and trade analysis.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
/// Fast, cheap model for clarifications and question validation.
pub const FAST_MODEL: &str = "claude-3-5-haiku-20241022";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Messages API wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    id: Option<String>,
    content: Vec<ContentBlock>,
    usage: ApiUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    input_tokens: u32,
    output_tokens: u32,
}

impl MessagesResponse {
    fn text(&self) -> String {
        self.content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

// ---------------------------------------------------------------------------
// Decoded payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ValidationPayload {
    valid: bool,
}

#[derive(Debug, Deserialize)]
struct AnalysisPayload {
    valid: bool,
    analysis: String,
    sentiment: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Network-backed client for the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct LiveClient {
    http: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl LiveClient {
    pub fn new(http: Client, api_key: String) -> Self {
        Self {
            http,
            api_key,
            base_url: ANTHROPIC_API_BASE.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Single Messages API round trip. Returns the concatenated text blocks.
    async fn complete(
        &self,
        model: &str,
        max_tokens: u32,
        prompt: &str,
    ) -> Result<Completion<String>, AnalysisError> {
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let request = MessagesRequest {
            model,
            max_tokens,
            messages: vec![RequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        let resp = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            let detail: String = detail.chars().take(300).collect();
            return Err(AnalysisError::Upstream(format!("status {status}: {detail}")));
        }

        let body = resp.text().await?;
        let envelope: MessagesResponse = serde_json::from_str(&body)?;

        let text = envelope.text();
        if text.trim().is_empty() {
            return Err(AnalysisError::Parse("response contained no text content".into()));
        }

        Ok(Completion {
            output: text,
            usage: TokenUsage::new(
                model,
                envelope.usage.input_tokens,
                envelope.usage.output_tokens,
            ),
            request_id: envelope.id,
        })
    }

    /// Run a prompt and decode the model's text as JSON of type `T`.
    async fn complete_json<T: DeserializeOwned>(
        &self,
        model: &str,
        max_tokens: u32,
        prompt: &str,
    ) -> Result<Completion<T>, AnalysisError> {
        let raw = self.complete(model, max_tokens, prompt).await?;
        let output = decode_payload::<T>(&raw.output)?;

        Ok(Completion {
            output,
            usage: raw.usage,
            request_id: raw.request_id,
        })
    }

    pub async fn generate_clarifications(
        &self,
        question: &str,
    ) -> Result<Completion<Vec<String>>, AnalysisError> {
        tracing::debug!(model = FAST_MODEL, "Requesting clarifications");
        let prompt = clarification_prompt(question);
        let completion = self
            .complete_json::<Vec<String>>(FAST_MODEL, 1024, &prompt)
            .await?;

        if completion.output.iter().all(|q| q.trim().is_empty()) {
            return Err(AnalysisError::Parse("no clarification questions returned".into()));
        }
        Ok(completion)
    }

    pub async fn generate_research_response(
        &self,
        question: &str,
        answers: &[ClarificationAnswer],
    ) -> Result<Completion<ResearchResult>, AnalysisError> {
        tracing::debug!(model = DEFAULT_MODEL, answers = answers.len(), "Requesting research response");
        let prompt = research_prompt(question, answers);
        self.complete_json::<ResearchResult>(DEFAULT_MODEL, 4096, &prompt)
            .await
    }

    pub async fn validate_question(&self, question: &str) -> Result<Completion<bool>, AnalysisError> {
        let prompt = validation_prompt(question);
        let completion = self
            .complete_json::<ValidationPayload>(FAST_MODEL, 256, &prompt)
            .await?;

        Ok(Completion {
            output: completion.output.valid,
            usage: completion.usage,
            request_id: completion.request_id,
        })
    }

    pub async fn analyze_stock_opportunity(
        &self,
        context: &StockContext,
    ) -> Result<Completion<StockAnalysis>, AnalysisError> {
        tracing::debug!(symbol = %context.symbol, model = DEFAULT_MODEL, "Requesting stock analysis");
        let prompt = analysis_prompt(context);
        let completion = self
            .complete_json::<AnalysisPayload>(DEFAULT_MODEL, 1024, &prompt)
            .await?;

        let payload = completion.output;
        let sentiment = Sentiment::from_api_str(&payload.sentiment).ok_or_else(|| {
            AnalysisError::Parse(format!("unknown sentiment label: {}", payload.sentiment))
        })?;

        Ok(Completion {
            output: StockAnalysis {
                valid: payload.valid,
                analysis: payload.analysis,
                sentiment,
            },
            usage: completion.usage,
            request_id: completion.request_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Payload decoding
// ---------------------------------------------------------------------------

/// Models sometimes wrap JSON in a markdown fence; peel it off.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (e.g. "json") on the opening line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

fn decode_payload<T: DeserializeOwned>(text: &str) -> Result<T, AnalysisError> {
    serde_json::from_str(strip_code_fence(text)).map_err(|e| AnalysisError::Parse(e.to_string()))
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

fn clarification_prompt(question: &str) -> String {
    format!(
        r#"You are an investment research assistant. A user asked:

"{question}"

Write 2-3 short follow-up questions that would help you answer well. Cover whichever of these
are unclear: risk tolerance, investment horizon, current allocation, specific goals or worries.

Reply with a JSON array of strings and nothing else, e.g.
["How long until you need this money?", "How would you react to a 20% drawdown?"]"#
    )
}

fn research_prompt(question: &str, answers: &[ClarificationAnswer]) -> String {
    let context = answers
        .iter()
        .map(|a| format!("Q: {}\nA: {}", a.question, a.answer))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an investment research assistant.

Question: {question}

What the user told you:
{context}

Reply with a single JSON object:
{{
  "summary": "two or three sentence takeaway",
  "analysis": "markdown analysis with ## headings and bullet points",
  "links": [{{"title": "...", "url": "https://...", "description": "..."}}]
}}

Stay balanced and educational, never give a definitive buy or sell call, and include 3-5 links to
reputable sources (SEC, Investopedia, major brokerages)."#
    )
}

fn validation_prompt(question: &str) -> String {
    format!(
        r#"Does the following question concern investing, personal finance or retirement planning?

Question: "{question}"

Reply with only {{"valid": true}} or {{"valid": false}}."#
    )
}

fn analysis_prompt(ctx: &StockContext) -> String {
    let mut news = ctx.headline.clone();
    if let Some(source) = ctx.news_source.as_deref().filter(|s| !s.is_empty()) {
        news.push_str(&format!(" (Source: {source})"));
    }
    let movement = ctx
        .movement_percent
        .map(|m| format!("{}%", m.round_dp(2)))
        .unwrap_or_else(|| "unknown".into());

    format!(
        r#"Assess this pre-market mover.

Symbol: {symbol}
Company: {company}
News: {news}
Price movement: {movement}

Explain what the news means for the price, whether it is a tradeable opportunity or a risk, and
what to watch at the open. Keep the analysis to 2-3 sentences.

Reply with a single JSON object:
{{"valid": true or false, "analysis": "...", "sentiment": "bullish" | "bearish" | "neutral"}}"#,
        symbol = ctx.symbol,
        company = ctx.company_name.as_deref().unwrap_or("Unknown"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n[\"a\"]\n```"), "[\"a\"]");
        assert_eq!(strip_code_fence("```\n{\"valid\": true}```"), "{\"valid\": true}");
        assert_eq!(strip_code_fence("  [1, 2] "), "[1, 2]");
    }

    #[test]
    fn test_decode_payload_errors_are_parse() {
        let err = decode_payload::<Vec<String>>("Sure! Here are some questions").unwrap_err();
        assert!(matches!(err, AnalysisError::Parse(_)));

        let ok: ValidationPayload = decode_payload("```json\n{\"valid\": false}\n```").unwrap();
        assert!(!ok.valid);
    }

    #[test]
    fn test_envelope_text_joins_text_blocks() {
        let raw = r#"{
            "id": "msg_1",
            "content": [
                {"type": "text", "text": "[\"a\","},
                {"type": "tool_use"},
                {"type": "text", "text": "\"b\"]"}
            ],
            "usage": {"input_tokens": 12, "output_tokens": 7}
        }"#;
        let envelope: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.text(), "[\"a\",\"b\"]");
        assert_eq!(envelope.usage.input_tokens, 12);
    }

    #[test]
    fn test_analysis_prompt_carries_context() {
        let ctx = StockContext {
            symbol: "XYZ".into(),
            company_name: None,
            headline: "XYZ wins contract".into(),
            news_source: Some("Reuters".into()),
            movement_percent: Some(Decimal::new(12346, 3)),
        };
        let prompt = analysis_prompt(&ctx);
        assert!(prompt.contains("Symbol: XYZ"));
        assert!(prompt.contains("Company: Unknown"));
        assert!(prompt.contains("XYZ wins contract (Source: Reuters)"));
        assert!(prompt.contains("12.35%"));
    }

    #[test]
    fn test_research_prompt_lists_answers() {
        let answers = vec![ClarificationAnswer {
            question: "Horizon?".into(),
            answer: "10 years".into(),
        }];
        let prompt = research_prompt("Index funds?", &answers);
        assert!(prompt.contains("Q: Horizon?\nA: 10 years"));
    }
}
