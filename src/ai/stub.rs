use crate::models::Sentiment;

use super::types::{
    ClarificationAnswer, Completion, ResearchResult, ResourceLink, StockAnalysis, StockContext,
    TokenUsage,
};

/// Model identifier recorded for stub calls; priced at zero.
pub const STUB_MODEL: &str = "stub";

/// Fixed (prompt, completion) token counts per capability.
pub const CLARIFY_TOKENS: (u32, u32) = (100, 50);
pub const RESPOND_TOKENS: (u32, u32) = (500, 350);
pub const VALIDATE_TOKENS: (u32, u32) = (50, 10);
pub const ANALYZE_TOKENS: (u32, u32) = (200, 100);

const INVESTMENT_KEYWORDS: &[&str] = &[
    "invest", "stock", "bond", "portfolio", "401k", "retirement", "market", "fund", "asset",
    "diversif", "risk", "return",
];

const STUB_ANALYSIS_MARKDOWN: &str = "\
## Key Considerations

- **Risk Tolerance**: Consider how market volatility affects your comfort level
- **Time Horizon**: Your timeline until retirement affects how much risk you can take
- **Diversification**: A mix of assets can help manage risk while pursuing growth
- **Regular Review**: Revisit your allocation periodically as your situation changes

## Balanced Approach

For most investors, a diversified portfolio including both stocks (for growth) and bonds \
(for stability) makes sense. The exact allocation depends on your specific circumstances.
";

/// Offline client: canned, deterministic answers and no network I/O.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StubClient;

impl StubClient {
    pub fn new() -> Self {
        Self
    }

    fn completion<T>(output: T, tokens: (u32, u32), request_id: &str) -> Completion<T> {
        Completion {
            output,
            usage: TokenUsage::new(STUB_MODEL, tokens.0, tokens.1),
            request_id: Some(request_id.into()),
        }
    }

    pub fn generate_clarifications(&self, _question: &str) -> Completion<Vec<String>> {
        let questions = vec![
            "What is your current age and target retirement age?".to_string(),
            "How would you describe your risk tolerance (conservative, moderate, aggressive)?"
                .to_string(),
            "What percentage of your portfolio is currently in stocks vs. bonds?".to_string(),
        ];
        Self::completion(questions, CLARIFY_TOKENS, "stub-request-clarify")
    }

    pub fn generate_research_response(
        &self,
        _question: &str,
        _answers: &[ClarificationAnswer],
    ) -> Completion<ResearchResult> {
        let result = ResearchResult {
            summary: "Based on your context, a balanced approach between stocks and bonds may be \
                      appropriate for your retirement timeline and risk tolerance."
                .into(),
            analysis: STUB_ANALYSIS_MARKDOWN.into(),
            links: vec![
                link(
                    "Understanding Asset Allocation - Investopedia",
                    "https://www.investopedia.com/terms/a/assetallocation.asp",
                    "Comprehensive guide to portfolio allocation strategies",
                ),
                link(
                    "Bonds vs. Stocks - Fidelity",
                    "https://www.fidelity.com/learning-center/investment-products/bonds/bonds-vs-stocks",
                    "Fidelity's comparison of bonds and stocks",
                ),
                link(
                    "Asset Allocation Calculator - Vanguard",
                    "https://investor.vanguard.com/calculator-tools/asset-allocation",
                    "Tool to help determine appropriate allocation",
                ),
                link(
                    "Retirement Investing - SEC",
                    "https://www.investor.gov/introduction-investing/investing-basics/save-invest/savings-and-investing-retirement",
                    "SEC guidance on retirement investing",
                ),
            ],
        };
        Self::completion(result, RESPOND_TOKENS, "stub-request-respond")
    }

    /// Keyword heuristic standing in for the model's judgement.
    pub fn validate_question(&self, question: &str) -> Completion<bool> {
        let lower = question.to_lowercase();
        let valid = INVESTMENT_KEYWORDS.iter().any(|k| lower.contains(k));
        Self::completion(valid, VALIDATE_TOKENS, "stub-request-validate")
    }

    pub fn analyze_stock_opportunity(&self, context: &StockContext) -> Completion<StockAnalysis> {
        let has_catalyst = !context.headline.trim().is_empty();
        let analysis = if has_catalyst {
            format!(
                "{} is moving on \"{}\". Confirm the catalyst with a primary source, wait for \
                 the opening range to settle, and size the entry for a gap fade.",
                context.symbol,
                context.headline.trim()
            )
        } else {
            format!(
                "{} is moving without an identifiable catalyst. Treat the move as noise until \
                 news confirms it.",
                context.symbol
            )
        };

        let result = StockAnalysis {
            valid: has_catalyst,
            analysis,
            sentiment: Sentiment::Neutral,
        };
        Self::completion(result, ANALYZE_TOKENS, "stub-request-analyze")
    }
}

fn link(title: &str, url: &str, description: &str) -> ResourceLink {
    ResourceLink {
        title: title.into(),
        url: url.into(),
        description: Some(description.into()),
    }
}
