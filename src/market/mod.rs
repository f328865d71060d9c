pub mod context;
pub mod format;
pub mod metrics;
pub mod scanner;
pub mod snapshot;
pub mod vwap;

pub use context::{determine_sentiment, MarketContext};
pub use metrics::{change_percent, profit_loss, relative_volume_ratio, spread_percent};
pub use scanner::{select_movers, ScanConfig};
pub use snapshot::{DerivedMetrics, MarketSnapshot};
pub use vwap::{analyze_vwap, vwap, IntradayBar, VwapReading};
