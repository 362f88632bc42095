use crate::QuoteError;
use fixed::types::U64F64;

pub fn sqrt_price_x64_to_price_x64(sqrt_price_x64: u128) -> Result<U64F64, QuoteError> {
    let sqrt_price = U64F64::from_bits(sqrt_price_x64);
    sqrt_price.checked_mul(sqrt_price).ok_or(QuoteError::ArithmeticOverflow)
}

/// Returns the relative price change in percents (1% = 1.0).
pub fn price_impact_percent(price_before: f64, price_after: f64) -> f64 {
    (price_after / price_before - 1.0).abs() * 100.0
}
