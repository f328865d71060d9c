use rust_decimal::Decimal;

use super::snapshot::MarketSnapshot;

/// Minimum absolute move (percent) for a regular scan.
pub const DEFAULT_THRESHOLD: Decimal = Decimal::from_parts(5, 0, 0, false, 0);
/// Lower bar used when sweeping a wide universe for anything moving.
pub const DISCOVERY_THRESHOLD: Decimal = Decimal::from_parts(25, 0, 0, false, 1);
pub const DEFAULT_LIMIT: usize = 20;

/// How a scan picks movers out of a batch of snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Absolute percent move a snapshot must reach.
    pub threshold: Decimal,
    pub limit: usize,
    /// Report what would be tracked without writing anything.
    pub dry_run: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            limit: DEFAULT_LIMIT,
            dry_run: false,
        }
    }
}

impl ScanConfig {
    pub fn discovery() -> Self {
        Self {
            threshold: DISCOVERY_THRESHOLD,
            ..Self::default()
        }
    }
}

/// Snapshots whose move is at least `threshold` in either direction,
/// biggest absolute move first, at most `limit` of them.
///
/// Snapshots without a computable change are dropped. Ties keep input order.
pub fn select_movers(
    snapshots: &[MarketSnapshot],
    threshold: Decimal,
    limit: usize,
) -> Vec<&MarketSnapshot> {
    let mut ranked: Vec<(Decimal, &MarketSnapshot)> = snapshots
        .iter()
        .filter_map(|s| s.change_percent().map(|pct| (pct.abs(), s)))
        .filter(|(move_abs, _)| *move_abs >= threshold)
        .collect();

    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    ranked.into_iter().take(limit).map(|(_, s)| s).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(symbol: &str, price: i64, prev_close: i64) -> MarketSnapshot {
        MarketSnapshot {
            symbol: symbol.into(),
            current_price: Some(Decimal::from(price)),
            previous_close: Some(Decimal::from(prev_close)),
            ..MarketSnapshot::default()
        }
    }

    fn symbols(picked: &[&MarketSnapshot]) -> Vec<String> {
        picked.iter().map(|s| s.symbol.clone()).collect()
    }

    #[test]
    fn test_ranks_by_absolute_move() {
        let batch = vec![
            snap("UP6", 106, 100),
            snap("DN12", 88, 100),
            snap("UP9", 109, 100),
        ];

        let picked = select_movers(&batch, DEFAULT_THRESHOLD, 10);
        assert_eq!(symbols(&picked), vec!["DN12", "UP9", "UP6"]);
    }

    #[test]
    fn test_threshold_is_inclusive_both_directions() {
        let batch = vec![
            snap("UP5", 105, 100),
            snap("DN5", 95, 100),
            snap("UP4", 104, 100),
        ];

        let picked = select_movers(&batch, DEFAULT_THRESHOLD, 10);
        assert_eq!(symbols(&picked), vec!["UP5", "DN5"]);

        let picked = select_movers(&batch, DISCOVERY_THRESHOLD, 10);
        assert_eq!(picked.len(), 3);
    }

    #[test]
    fn test_drops_snapshots_without_change() {
        let batch = vec![
            MarketSnapshot::empty("NODATA"),
            MarketSnapshot {
                current_price: Some(Decimal::from(50)),
                ..MarketSnapshot::empty("NOCLOSE")
            },
            snap("FLAT", 100, 100),
            snap("UP20", 120, 100),
        ];

        let picked = select_movers(&batch, Decimal::ZERO, 10);
        assert_eq!(symbols(&picked), vec!["UP20", "FLAT"]);
    }

    #[test]
    fn test_limit_applies_after_ranking() {
        let batch: Vec<_> = (1..=30).map(|i| snap(&format!("S{i}"), 100 + i, 100)).collect();

        let picked = select_movers(&batch, DEFAULT_THRESHOLD, 3);
        assert_eq!(symbols(&picked), vec!["S30", "S29", "S28"]);
        assert!(select_movers(&batch, DEFAULT_THRESHOLD, 0).is_empty());
    }

    #[test]
    fn test_discovery_lowers_threshold_only() {
        let discovery = ScanConfig::discovery();
        assert_eq!(discovery.threshold, Decimal::new(25, 1));
        assert_eq!(discovery.limit, DEFAULT_LIMIT);
        assert_eq!(ScanConfig::default().threshold, Decimal::from(5));
    }
}
