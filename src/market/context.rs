use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::Sentiment;

use super::metrics::change_percent;
use super::snapshot::MarketSnapshot;

/// Broad-market backdrop a mover is judged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarketContext {
    pub spy_change: Decimal,
    pub qqq_change: Decimal,
    pub vix_level: Decimal,
    pub es_futures_change: Option<Decimal>,
    pub nq_futures_change: Option<Decimal>,
    pub sentiment: Sentiment,
}

/// Bullish: SPY up more than 0.5% with VIX under 18.
/// Bearish: SPY down more than 0.5% or VIX over 25.
pub fn determine_sentiment(spy_change: Decimal, vix_level: Decimal) -> Sentiment {
    let half_percent = Decimal::new(5, 1);
    if spy_change > half_percent && vix_level < Decimal::from(18) {
        Sentiment::Bullish
    } else if spy_change < -half_percent || vix_level > Decimal::from(25) {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    }
}

fn regular_change(quote: &MarketSnapshot) -> Option<Decimal> {
    change_percent(quote.current_price, quote.previous_close)
}

impl MarketContext {
    /// Build from index quotes. SPY, QQQ and VIX are required; futures are
    /// optional and may be missing outside their session.
    pub fn from_quotes(
        spy: &MarketSnapshot,
        qqq: &MarketSnapshot,
        vix: &MarketSnapshot,
        es_futures: Option<&MarketSnapshot>,
        nq_futures: Option<&MarketSnapshot>,
    ) -> Option<Self> {
        let spy_change = regular_change(spy)?;
        let qqq_change = regular_change(qqq)?;
        let vix_level = vix.current_price.filter(|v| *v > Decimal::ZERO)?;

        Some(Self {
            spy_change,
            qqq_change,
            vix_level,
            es_futures_change: es_futures.and_then(regular_change),
            nq_futures_change: nq_futures.and_then(regular_change),
            sentiment: determine_sentiment(spy_change, vix_level),
        })
    }

    /// SPY up and VIX under 20.
    pub fn is_risk_on(&self) -> bool {
        self.spy_change > Decimal::ZERO && self.vix_level < Decimal::from(20)
    }

    /// SPY down more than 0.5% and VIX over 25.
    pub fn is_risk_off(&self) -> bool {
        self.spy_change < Decimal::new(-5, 1) && self.vix_level > Decimal::from(25)
    }
}
