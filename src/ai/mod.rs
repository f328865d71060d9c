pub mod client;
pub mod gateway;
pub mod ledger;
pub mod live;
pub mod pricing;
pub mod stub;
pub mod types;

pub use client::{AnalysisClient, ClientKind};
pub use gateway::AnalysisGateway;
pub use ledger::{MemoryUsageLedger, UsageLedger};
pub use live::LiveClient;
pub use pricing::{estimate_cost, format_cost, model_price};
pub use stub::StubClient;
pub use types::{
    ClarificationAnswer, Completion, ResearchResult, ResourceLink, StockAnalysis, StockContext,
    TokenUsage,
};
