use rust_decimal::Decimal;

/// Relative volume (RVOL): current volume over average volume.
///
/// Current volume is the pre-market volume when it is present and positive,
/// otherwise the regular-market volume. Returns `None` whenever either side
/// of the ratio is absent or non-positive. Callers decide what counts as
/// "strong conviction" (conventionally > 3.0).
pub fn relative_volume_ratio(
    pre_market_volume: Option<i64>,
    regular_market_volume: Option<i64>,
    average_volume: Option<i64>,
) -> Option<Decimal> {
    let average = average_volume.filter(|v| *v > 0)?;

    let current = pre_market_volume
        .filter(|v| *v > 0)
        .or(regular_market_volume)
        .filter(|v| *v > 0)?;

    Decimal::from(current).checked_div(Decimal::from(average))
}

/// Bid-ask spread as a percentage of the bid: (ask - bid) / bid × 100.
pub fn spread_percent(bid: Option<Decimal>, ask: Option<Decimal>) -> Option<Decimal> {
    let bid = bid.filter(|b| *b > Decimal::ZERO)?;
    let ask = ask?;

    percent_of(ask.checked_sub(bid)?, bid)
}

/// Percentage move of `price` against the previous close.
pub fn change_percent(price: Option<Decimal>, previous_close: Option<Decimal>) -> Option<Decimal> {
    let price = price?;
    let previous_close = previous_close.filter(|p| *p > Decimal::ZERO)?;

    percent_of(price.checked_sub(previous_close)?, previous_close)
}

/// Realized profit/loss per share once both legs of a trade are known.
pub fn profit_loss(entry_price: Option<Decimal>, exit_price: Option<Decimal>) -> Option<Decimal> {
    exit_price?.checked_sub(entry_price?)
}

/// `part / base × 100`, or `None` when the result does not fit a `Decimal`.
pub(crate) fn percent_of(part: Decimal, base: Decimal) -> Option<Decimal> {
    part.checked_div(base)?.checked_mul(Decimal::ONE_HUNDRED)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
