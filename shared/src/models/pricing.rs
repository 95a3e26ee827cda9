//! Bottle pricing figures

use rust_decimal::Decimal;

/// Margins below this percentage get a price recommendation
pub const MIN_HEALTHY_MARGIN_PERCENT: u32 = 60;

/// Cost of goods as a share of price the recommendation aims for (65% margin)
pub fn target_cost_ratio() -> Decimal {
    Decimal::new(35, 2)
}

/// `part / whole` as a percentage, or `None` when it overflows
fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    part.checked_div(whole)?
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|p| p.round_dp(2))
}

/// Profit as a percentage of price, rounded to 2 decimal places.
/// `None` when price or cost is not positive.
pub fn profit_margin_percent(price: Decimal, cost: Decimal) -> Option<Decimal> {
    if price <= Decimal::ZERO || cost <= Decimal::ZERO {
        return None;
    }
    percent_of(price - cost, price)
}

/// Profit as a percentage of cost, rounded to 2 decimal places
pub fn markup_percent(price: Decimal, cost: Decimal) -> Option<Decimal> {
    if price <= Decimal::ZERO || cost <= Decimal::ZERO {
        return None;
    }
    percent_of(price - cost, cost)
}

/// Suggested menu price when the current margin is below target
pub fn recommended_price(price: Decimal, cost: Decimal) -> Option<Decimal> {
    let margin = profit_margin_percent(price, cost)?;
    if margin < Decimal::from(MIN_HEALTHY_MARGIN_PERCENT) {
        cost.checked_div(target_cost_ratio()).map(|p| p.round_dp(2))
    } else {
        None
    }
}
