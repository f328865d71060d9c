use crate::config::AiConfig;
use crate::errors::AnalysisError;

use super::live::LiveClient;
use super::stub::StubClient;
use super::types::{
    ClarificationAnswer, Completion, ResearchResult, StockAnalysis, StockContext,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    Stub,
    Live,
}

impl ClientKind {
    /// Selection rule: explicit stub flag wins, then a usable key selects live.
    pub fn select(config: &AiConfig) -> Self {
        if config.use_stub || config.usable_api_key().is_none() {
            ClientKind::Stub
        } else {
            ClientKind::Live
        }
    }
}

/// The analysis backend. Chosen once from configuration, never per call.
#[derive(Debug, Clone)]
pub enum AnalysisClient {
    Stub(StubClient),
    Live(LiveClient),
}

impl AnalysisClient {
    /// Never fails and performs no I/O: a missing key degrades to the stub.
    pub fn from_config(config: &AiConfig) -> Self {
        match (ClientKind::select(config), config.usable_api_key()) {
            (ClientKind::Live, Some(key)) => AnalysisClient::Live(
                LiveClient::new(reqwest::Client::new(), key.to_string())
                    .with_base_url(config.base_url.clone())
                    .with_timeout(config.timeout),
            ),
            _ => AnalysisClient::Stub(StubClient::new()),
        }
    }

    pub fn kind(&self) -> ClientKind {
        match self {
            AnalysisClient::Stub(_) => ClientKind::Stub,
            AnalysisClient::Live(_) => ClientKind::Live,
        }
    }

    pub fn is_stub(&self) -> bool {
        self.kind() == ClientKind::Stub
    }

    pub async fn generate_clarifications(
        &self,
        question: &str,
    ) -> Result<Completion<Vec<String>>, AnalysisError> {
        match self {
            AnalysisClient::Stub(c) => Ok(c.generate_clarifications(question)),
            AnalysisClient::Live(c) => c.generate_clarifications(question).await,
        }
    }

    pub async fn generate_research_response(
        &self,
        question: &str,
        answers: &[ClarificationAnswer],
    ) -> Result<Completion<ResearchResult>, AnalysisError> {
        match self {
            AnalysisClient::Stub(c) => Ok(c.generate_research_response(question, answers)),
            AnalysisClient::Live(c) => c.generate_research_response(question, answers).await,
        }
    }

    pub async fn validate_question(&self, question: &str) -> Result<Completion<bool>, AnalysisError> {
        match self {
            AnalysisClient::Stub(c) => Ok(c.validate_question(question)),
            AnalysisClient::Live(c) => c.validate_question(question).await,
        }
    }

    pub async fn analyze_stock_opportunity(
        &self,
        context: &StockContext,
    ) -> Result<Completion<StockAnalysis>, AnalysisError> {
        match self {
            AnalysisClient::Stub(c) => Ok(c.analyze_stock_opportunity(context)),
            AnalysisClient::Live(c) => c.analyze_stock_opportunity(context).await,
        }
    }
}
