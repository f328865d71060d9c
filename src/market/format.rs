use rust_decimal::Decimal;

pub fn format_price(price: Option<Decimal>) -> String {
    match price {
        Some(p) => format!("${:.2}", p),
        None => "N/A".into(),
    }
}

/// Signed percentage, e.g. `+3.21%` / `-1.50%`.
pub fn format_percent(percent: Option<Decimal>) -> String {
    match percent {
        Some(p) => {
            let sign = if p > Decimal::ZERO { "+" } else { "" };
            format!("{sign}{:.2}%", p)
        }
        None => "N/A".into(),
    }
}

/// Volume with K/M/B suffix. Zero volume is shown as missing.
pub fn format_volume(volume: Option<i64>) -> String {
    let Some(v) = volume.filter(|v| *v != 0) else {
        return "N/A".into();
    };

    let abs = v.unsigned_abs();
    if abs >= 1_000_000_000 {
        format!("{:.2}B", v as f64 / 1_000_000_000.0)
    } else if abs >= 1_000_000 {
        format!("{:.2}M", v as f64 / 1_000_000.0)
    } else if abs >= 1_000 {
        format!("{:.2}K", v as f64 / 1_000.0)
    } else {
        v.to_string()
    }
}
