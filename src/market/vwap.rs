use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::format::format_percent;
use super::metrics::percent_of;

/// One intraday interval (e.g. a 5-minute bar).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntradayBar {
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
}

impl IntradayBar {
    /// (high + low + close) / 3
    pub fn typical_price(&self) -> Option<Decimal> {
        self.high
            .checked_add(self.low)?
            .checked_add(self.close)?
            .checked_div(Decimal::from(3))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VwapSignal {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStrength {
    Strong,
    Moderate,
    Weak,
}

impl SignalStrength {
    /// ≥ 2% strong, ≥ 0.5% moderate, otherwise weak.
    pub fn from_distance(distance_percent: Decimal) -> Self {
        let distance = distance_percent.abs();
        if distance >= Decimal::from(2) {
            SignalStrength::Strong
        } else if distance >= Decimal::new(5, 1) {
            SignalStrength::Moderate
        } else {
            SignalStrength::Weak
        }
    }
}

impl fmt::Display for VwapSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VwapSignal::Above => "Above",
            VwapSignal::Below => "Below",
        })
    }
}

/// Where the last close sits relative to the session VWAP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VwapReading {
    pub vwap: Decimal,
    pub current_price: Decimal,
    pub distance_dollars: Decimal,
    pub distance_percent: Decimal,
    pub signal: VwapSignal,
    pub strength: SignalStrength,
}

impl VwapReading {
    /// e.g. "Above VWAP +2.30%"
    pub fn label(&self) -> String {
        format!("{} VWAP {}", self.signal, format_percent(Some(self.distance_percent)))
    }
}

/// Σ(typical price × volume) / Σ(volume). `None` for no bars or no volume.
pub fn vwap(bars: &[IntradayBar]) -> Option<Decimal> {
    let mut weighted = Decimal::ZERO;
    let mut volume = Decimal::ZERO;

    for bar in bars.iter().filter(|b| b.volume > 0) {
        let v = Decimal::from(bar.volume);
        weighted = weighted.checked_add(bar.typical_price()?.checked_mul(v)?)?;
        volume = volume.checked_add(v)?;
    }

    if volume.is_zero() {
        return None;
    }
    weighted.checked_div(volume)
}

/// Compare the most recent close against the session VWAP.
pub fn analyze_vwap(bars: &[IntradayBar]) -> Option<VwapReading> {
    let vwap = vwap(bars).filter(|v| *v > Decimal::ZERO)?;
    let current_price = bars.last()?.close;

    let distance_dollars = current_price.checked_sub(vwap)?;
    let distance_percent = percent_of(distance_dollars, vwap)?;

    Some(VwapReading {
        vwap,
        current_price,
        distance_dollars,
        distance_percent,
        signal: if current_price >= vwap {
            VwapSignal::Above
        } else {
            VwapSignal::Below
        },
        strength: SignalStrength::from_distance(distance_percent),
    })
}
