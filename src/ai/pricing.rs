use rust_decimal::Decimal;

use super::live::{DEFAULT_MODEL, FAST_MODEL};
use super::stub::STUB_MODEL;
use super::types::TokenUsage;

/// USD per token, split by direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelPrice {
    pub input: Decimal,
    pub output: Decimal,
}

/// Published per-token prices (October 2024 list prices).
pub fn model_price(model: &str) -> Option<ModelPrice> {
    match model {
        // $3 / $15 per million tokens
        DEFAULT_MODEL => Some(ModelPrice {
            input: Decimal::new(3, 6),
            output: Decimal::new(15, 6),
        }),
        // $1 / $5 per million tokens
        FAST_MODEL => Some(ModelPrice {
            input: Decimal::new(1, 6),
            output: Decimal::new(5, 6),
        }),
        STUB_MODEL => Some(ModelPrice {
            input: Decimal::ZERO,
            output: Decimal::ZERO,
        }),
        _ => None,
    }
}

/// Estimated USD cost of a call. Unknown models cost zero; check
/// [`model_price`] to tell "free" from "unpriced".
pub fn estimate_cost(usage: &TokenUsage) -> Decimal {
    let Some(price) = model_price(&usage.model) else {
        return Decimal::ZERO;
    };

    Decimal::from(usage.prompt_tokens) * price.input
        + Decimal::from(usage.completion_tokens) * price.output
}

/// `$0.00` for zero, four decimals under a cent, two otherwise.
pub fn format_cost(cost: Decimal) -> String {
    if cost.is_zero() {
        "$0.00".into()
    } else if cost < Decimal::new(1, 2) {
        format!("${:.4}", cost)
    } else {
        format!("${:.2}", cost)
    }
}
