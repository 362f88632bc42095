use crate::{mul_div, Percentage, PoolToken, QuoteError, Rounding, SwapFeeRate, HUNDRED_PERCENT, SWAP_FEE_RATE_DENOMINATOR};
use fusionamm_core::TokenPair;

/// Returns the amount left after the tuna protocol fee is taken.
pub fn apply_tuna_protocol_fee(amount: u64, protocol_fee_rate: Percentage, round_up: bool) -> Result<u64, QuoteError> {
    let rate = protocol_fee_rate.value() as u128;
    if rate > HUNDRED_PERCENT as u128 {
        return Err(QuoteError::ProtocolFeeRateOutOfRange);
    }
    mul_div(amount, HUNDRED_PERCENT as u128 - rate, HUNDRED_PERCENT as u128, Rounding::from_round_up(round_up))
}

/// Returns the gross amount that nets `amount` after the tuna protocol fee is taken.
pub fn reverse_apply_tuna_protocol_fee(amount: u64, protocol_fee_rate: Percentage, round_up: bool) -> Result<u64, QuoteError> {
    let rate = protocol_fee_rate.value() as u128;
    if rate >= HUNDRED_PERCENT as u128 {
        return Err(QuoteError::ProtocolFeeRateOutOfRange);
    }
    mul_div(amount, HUNDRED_PERCENT as u128, HUNDRED_PERCENT as u128 - rate, Rounding::from_round_up(round_up))
}

/// Protocol fee of a collateral and borrow pair, each leg rounded down on its own.
pub fn calculate_tuna_protocol_fee(
    collateral: u64,
    borrow: u64,
    protocol_fee_rate_on_collateral: Percentage,
    protocol_fee_rate: Percentage,
) -> Result<u64, QuoteError> {
    let fee_on_collateral = mul_div(collateral, protocol_fee_rate_on_collateral.value() as u128, HUNDRED_PERCENT as u128, Rounding::Down)?;
    let fee_on_borrow = mul_div(borrow, protocol_fee_rate.value() as u128, HUNDRED_PERCENT as u128, Rounding::Down)?;
    fee_on_collateral.checked_add(fee_on_borrow).ok_or(QuoteError::ArithmeticOverflow)
}

/// Similar to the function implemented in FusionAMM, but supports various rounding modes.
pub fn apply_swap_fee(amount: u64, fee_rate: SwapFeeRate, round_up: bool) -> Result<u64, QuoteError> {
    let rate = fee_rate.value() as u128;
    if rate > SWAP_FEE_RATE_DENOMINATOR as u128 {
        return Err(QuoteError::SwapFeeRateOutOfRange);
    }
    mul_div(amount, SWAP_FEE_RATE_DENOMINATOR as u128 - rate, SWAP_FEE_RATE_DENOMINATOR as u128, Rounding::from_round_up(round_up))
}

/// Similar to the function implemented in FusionAMM, but supports various rounding modes.
pub fn reverse_apply_swap_fee(amount: u64, fee_rate: SwapFeeRate, round_up: bool) -> Result<u64, QuoteError> {
    let rate = fee_rate.value() as u128;
    if rate >= SWAP_FEE_RATE_DENOMINATOR as u128 {
        return Err(QuoteError::SwapFeeRateOutOfRange);
    }
    mul_div(amount, SWAP_FEE_RATE_DENOMINATOR as u128, SWAP_FEE_RATE_DENOMINATOR as u128 - rate, Rounding::from_round_up(round_up))
}

/// Splits the protocol fee of a spot position operation between the pool tokens.
pub fn calculate_tuna_spot_position_protocol_fee(
    collateral_token: PoolToken,
    borrowed_token: PoolToken,
    collateral: u64,
    borrow: u64,
    protocol_fee_rate_on_collateral: Percentage,
    protocol_fee_rate: Percentage,
) -> Result<TokenPair, QuoteError> {
    let (collateral_a, collateral_b) = collateral_token.split(collateral);
    let (borrow_a, borrow_b) = borrowed_token.split(borrow);

    Ok(TokenPair {
        a: calculate_tuna_protocol_fee(collateral_a, borrow_a, protocol_fee_rate_on_collateral, protocol_fee_rate)?,
        b: calculate_tuna_protocol_fee(collateral_b, borrow_b, protocol_fee_rate_on_collateral, protocol_fee_rate)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_PERCENT: Percentage = Percentage::new(HUNDRED_PERCENT / 100);

    #[test]
    fn test_apply_tuna_protocol_fee() {
        assert_eq!(apply_tuna_protocol_fee(1_000_000, ONE_PERCENT, false), Ok(990_000));
        assert_eq!(apply_tuna_protocol_fee(999, ONE_PERCENT, false), Ok(989));
        assert_eq!(apply_tuna_protocol_fee(999, ONE_PERCENT, true), Ok(990));
        assert_eq!(apply_tuna_protocol_fee(999, Percentage::ZERO, false), Ok(999));
        assert_eq!(apply_tuna_protocol_fee(999, Percentage::HUNDRED, false), Ok(0));
        assert_eq!(
            apply_tuna_protocol_fee(999, Percentage::new(HUNDRED_PERCENT + 1), false),
            Err(QuoteError::ProtocolFeeRateOutOfRange)
        );
    }

    #[test]
    fn test_protocol_fee_round_trip() {
        for amount in [1u64, 2, 99, 101, 1_000, 123_456_789, u64::MAX / 2] {
            for rate in [1u32, 100, 5_000, 10_000, 500_000, 999_999] {
                let rate = Percentage::new(rate);
                let net = apply_tuna_protocol_fee(amount, rate, false).unwrap();
                assert!(net <= amount);

                // Flooring the net amount loses up to one unit, which the reversal scales by S / (S - rate).
                let gross = reverse_apply_tuna_protocol_fee(net, rate, true).unwrap();
                let max_loss = (HUNDRED_PERCENT as u64).div_ceil(HUNDRED_PERCENT as u64 - rate.value() as u64);
                assert!(gross >= net);
                assert!(gross <= amount);
                assert!(gross + max_loss >= amount);
            }
            assert_eq!(apply_tuna_protocol_fee(amount, Percentage::ZERO, false), Ok(amount));
        }
    }

    #[test]
    fn test_protocol_fee_round_trip_can_fall_short() {
        let half = Percentage::new(HUNDRED_PERCENT / 2);
        let net = apply_tuna_protocol_fee(101, half, false).unwrap();
        assert_eq!(net, 50);
        assert_eq!(reverse_apply_tuna_protocol_fee(net, half, true), Ok(100));

        // Exact multiples of the net scale survive the round trip.
        let net = apply_tuna_protocol_fee(100, half, false).unwrap();
        assert_eq!(reverse_apply_tuna_protocol_fee(net, half, true), Ok(100));
    }

    #[test]
    fn test_reverse_apply_tuna_protocol_fee() {
        assert_eq!(reverse_apply_tuna_protocol_fee(990_000, ONE_PERCENT, false), Ok(1_000_000));
        assert_eq!(reverse_apply_tuna_protocol_fee(1_000, ONE_PERCENT, false), Ok(1_010));
        assert_eq!(reverse_apply_tuna_protocol_fee(1_000, ONE_PERCENT, true), Ok(1_011));
        assert_eq!(
            reverse_apply_tuna_protocol_fee(1_000, Percentage::HUNDRED, true),
            Err(QuoteError::ProtocolFeeRateOutOfRange)
        );
    }

    #[test]
    fn test_swap_fee() {
        let fee_rate = SwapFeeRate::new(3000);
        assert_eq!(apply_swap_fee(1_000_000, fee_rate, false), Ok(997_000));
        assert_eq!(apply_swap_fee(742_586, SwapFeeRate::new(10_000), false), Ok(735_160));
        assert_eq!(reverse_apply_swap_fee(997_000, fee_rate, false), Ok(1_000_000));
        assert_eq!(reverse_apply_swap_fee(1_000, fee_rate, true), Ok(1_004));
        assert_eq!(reverse_apply_swap_fee(1_000, SwapFeeRate::new(1_000_000), true), Err(QuoteError::SwapFeeRateOutOfRange));
    }

    #[test]
    fn test_calculate_tuna_protocol_fee() {
        assert_eq!(calculate_tuna_protocol_fee(1_000_000, 2_000_000, ONE_PERCENT, ONE_PERCENT), Ok(30_000));
        assert_eq!(calculate_tuna_protocol_fee(1_000_000, 2_000_000, Percentage::new(HUNDRED_PERCENT / 200), ONE_PERCENT), Ok(25_000));
    }

    #[test]
    fn test_calculate_tuna_protocol_fee_rounds_each_leg() {
        // A single division over the summed products would yield 1 and 30_001.
        assert_eq!(calculate_tuna_protocol_fee(50, 50, ONE_PERCENT, ONE_PERCENT), Ok(0));
        assert_eq!(calculate_tuna_protocol_fee(1_000_050, 2_000_050, ONE_PERCENT, ONE_PERCENT), Ok(30_000));
        assert_eq!(calculate_tuna_protocol_fee(u64::MAX, 0, Percentage::HUNDRED, ONE_PERCENT), Ok(u64::MAX));
        assert_eq!(
            calculate_tuna_protocol_fee(u64::MAX, u64::MAX, Percentage::HUNDRED, Percentage::HUNDRED),
            Err(QuoteError::ArithmeticOverflow)
        );
    }

    #[test]
    fn test_calculate_tuna_spot_position_protocol_fee() {
        let fee = calculate_tuna_spot_position_protocol_fee(PoolToken::A, PoolToken::B, 1_000_000, 2_000_000, ONE_PERCENT, ONE_PERCENT).unwrap();
        assert_eq!(fee.a, 10_000);
        assert_eq!(fee.b, 20_000);

        let fee = calculate_tuna_spot_position_protocol_fee(PoolToken::B, PoolToken::B, 1_000_000, 2_000_000, ONE_PERCENT, ONE_PERCENT).unwrap();
        assert_eq!(fee.a, 0);
        assert_eq!(fee.b, 30_000);
    }
}
