use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::metrics;

/// Raw per-symbol quote as delivered by the market-data provider.
/// Any field may be missing (market closed, unknown symbol, rate-limited).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub current_price: Option<Decimal>,
    #[serde(default)]
    pub previous_close: Option<Decimal>,
    #[serde(default)]
    pub pre_market_price: Option<Decimal>,
    #[serde(default)]
    pub bid: Option<Decimal>,
    #[serde(default)]
    pub ask: Option<Decimal>,
    #[serde(default)]
    pub pre_market_volume: Option<i64>,
    #[serde(default)]
    pub regular_market_volume: Option<i64>,
    #[serde(default)]
    pub average_volume: Option<i64>,
}

/// Metrics derived from a snapshot. Every field is independently optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DerivedMetrics {
    pub relative_volume_ratio: Option<Decimal>,
    pub spread_percent: Option<Decimal>,
    pub change_percent: Option<Decimal>,
}

impl MarketSnapshot {
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    pub fn has_pre_market_data(&self) -> bool {
        self.pre_market_price.is_some()
    }

    /// Most relevant price: pre-market if available, else current.
    pub fn display_price(&self) -> Option<Decimal> {
        self.pre_market_price.or(self.current_price)
    }

    pub fn change_percent(&self) -> Option<Decimal> {
        metrics::change_percent(self.display_price(), self.previous_close)
    }

    /// Volume the mover is judged on: pre-market when printed, else regular.
    pub fn current_volume(&self) -> Option<i64> {
        self.pre_market_volume
            .filter(|v| *v > 0)
            .or(self.regular_market_volume)
    }

    pub fn derive(&self) -> DerivedMetrics {
        DerivedMetrics {
            relative_volume_ratio: metrics::relative_volume_ratio(
                self.pre_market_volume,
                self.regular_market_volume,
                self.average_volume,
            ),
            spread_percent: metrics::spread_percent(self.bid, self.ask),
            change_percent: self.change_percent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_derives_nothing() {
        let derived = MarketSnapshot::empty("XYZ").derive();
        assert_eq!(derived, DerivedMetrics::default());
    }

    #[test]
    fn test_full_snapshot() {
        let snap = MarketSnapshot {
            symbol: "ACME".into(),
            company_name: Some("Acme Corp".into()),
            current_price: Some(Decimal::from(100)),
            previous_close: Some(Decimal::from(100)),
            pre_market_price: Some(Decimal::from(112)),
            bid: Some(Decimal::from(10)),
            ask: Some(Decimal::new(102, 1)),
            pre_market_volume: Some(400_000),
            regular_market_volume: Some(1_000_000),
            average_volume: Some(100_000),
        };

        assert!(snap.has_pre_market_data());
        assert_eq!(snap.display_price(), Some(Decimal::from(112)));
        assert_eq!(snap.current_volume(), Some(400_000));

        let derived = snap.derive();
        assert_eq!(derived.relative_volume_ratio, Some(Decimal::from(4)));
        assert_eq!(derived.spread_percent, Some(Decimal::from(2)));
        assert_eq!(derived.change_percent, Some(Decimal::from(12)));
    }

    #[test]
    fn test_display_price_falls_back_to_current() {
        let snap = MarketSnapshot {
            current_price: Some(Decimal::from(50)),
            previous_close: Some(Decimal::from(40)),
            ..MarketSnapshot::empty("FOO")
        };
        assert!(!snap.has_pre_market_data());
        assert_eq!(snap.display_price(), Some(Decimal::from(50)));
        assert_eq!(snap.change_percent(), Some(Decimal::from(25)));
    }

    #[test]
    fn test_deserialize_sparse_payload() {
        let snap: MarketSnapshot = serde_json::from_str(r#"{"symbol":"BAR","bid":"1.5"}"#).unwrap();
        assert_eq!(snap.symbol, "BAR");
        assert_eq!(snap.bid, Some(Decimal::new(15, 1)));
        assert_eq!(snap.derive().spread_percent, None);
    }

    #[test]
    fn test_degenerate_quote_derives_none_instead_of_panicking() {
        let snap = MarketSnapshot {
            symbol: "PENNY".into(),
            current_price: Some(Decimal::from(1_000_000_000_000i64)),
            previous_close: Some(Decimal::new(1, 20)),
            bid: Some(Decimal::new(1, 20)),
            ask: Some(Decimal::from(1_000_000_000_000i64)),
            ..MarketSnapshot::default()
        };

        let derived = snap.derive();
        assert_eq!(derived.change_percent, None);
        assert_eq!(derived.spread_percent, None);
    }
}
