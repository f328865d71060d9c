use std::sync::Arc;

use metrics::counter;

use crate::config::AiConfig;
use crate::errors::{AnalysisError, GatewayError};
use crate::models::{Endpoint, NewUsageEntry, UsageContext, UsageLogEntry};

use super::client::AnalysisClient;
use super::ledger::UsageLedger;
use super::pricing::{estimate_cost, model_price};
use super::types::{
    ClarificationAnswer, Completion, ResearchResult, StockAnalysis, StockContext, TokenUsage,
};

/// Single entry point for analysis calls. Every successful call leaves
/// exactly one ledger entry behind; failed calls leave none.
#[derive(Clone)]
pub struct AnalysisGateway {
    client: AnalysisClient,
    ledger: Arc<dyn UsageLedger>,
}

impl AnalysisGateway {
    pub fn new(client: AnalysisClient, ledger: Arc<dyn UsageLedger>) -> Self {
        Self { client, ledger }
    }

    pub fn from_config(config: &AiConfig, ledger: Arc<dyn UsageLedger>) -> Self {
        Self::new(AnalysisClient::from_config(config), ledger)
    }

    pub fn client(&self) -> &AnalysisClient {
        &self.client
    }

    pub fn ledger(&self) -> &Arc<dyn UsageLedger> {
        &self.ledger
    }

    pub async fn generate_clarifications(
        &self,
        question: &str,
        context: UsageContext,
    ) -> Result<Completion<Vec<String>>, GatewayError> {
        let result = self.client.generate_clarifications(question).await;
        self.settle(Endpoint::Clarify, context, result).await
    }

    pub async fn generate_research_response(
        &self,
        question: &str,
        answers: &[ClarificationAnswer],
        context: UsageContext,
    ) -> Result<Completion<ResearchResult>, GatewayError> {
        let result = self.client.generate_research_response(question, answers).await;
        self.settle(Endpoint::Respond, context, result).await
    }

    pub async fn validate_question(
        &self,
        question: &str,
        context: UsageContext,
    ) -> Result<Completion<bool>, GatewayError> {
        let result = self.client.validate_question(question).await;
        self.settle(Endpoint::Validate, context, result).await
    }

    pub async fn analyze_stock_opportunity(
        &self,
        stock: &StockContext,
        context: UsageContext,
    ) -> Result<Completion<StockAnalysis>, GatewayError> {
        let result = self.client.analyze_stock_opportunity(stock).await;
        self.settle(Endpoint::Analyze, context, result).await
    }

    /// Record usage for a successful call; pass failures through untouched.
    async fn settle<T>(
        &self,
        endpoint: Endpoint,
        context: UsageContext,
        result: Result<Completion<T>, AnalysisError>,
    ) -> Result<Completion<T>, GatewayError> {
        match result {
            Ok(completion) => {
                self.record(endpoint, context, &completion.usage).await?;
                Ok(completion)
            }
            Err(e) => {
                counter!("ai_call_failures_total", "endpoint" => endpoint.as_str()).increment(1);
                Err(e.into())
            }
        }
    }

    async fn record(
        &self,
        endpoint: Endpoint,
        context: UsageContext,
        usage: &TokenUsage,
    ) -> Result<UsageLogEntry, GatewayError> {
        if model_price(&usage.model).is_none() {
            tracing::warn!(
                model = %usage.model,
                "No price on file for model; recording zero cost"
            );
        }

        let entry = NewUsageEntry {
            endpoint,
            model: usage.model.clone(),
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            cost_estimate: estimate_cost(usage),
            context,
        };

        let row = match self.ledger.append(entry).await {
            Ok(row) => row,
            Err(e) => {
                counter!("ai_ledger_failures_total", "endpoint" => endpoint.as_str()).increment(1);
                tracing::error!(error = %e, endpoint = %endpoint, "Failed to record AI usage");
                return Err(GatewayError::Ledger(e));
            }
        };

        counter!("ai_calls_total", "endpoint" => endpoint.as_str()).increment(1);
        counter!("ai_tokens_total", "model" => usage.model.clone())
            .increment(u64::from(usage.total_tokens()));

        tracing::debug!(
            endpoint = %endpoint,
            model = %row.model,
            total_tokens = row.total_tokens,
            cost = %row.cost_estimate,
            "Recorded AI usage"
        );

        Ok(row)
    }
}
