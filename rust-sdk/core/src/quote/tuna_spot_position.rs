use crate::{
    apply_swap_fee, apply_tuna_protocol_fee, calculate_tuna_spot_position_protocol_fee, mul_div, mul_div_64, price_impact_percent,
    reverse_apply_swap_fee, reverse_apply_tuna_protocol_fee, Percentage, PoolToken, QuoteError, Rounding, SwapFeeRate,
    DEFAULT_SLIPPAGE_TOLERANCE_BPS, HUNDRED_PERCENT, MAX_LEVERAGE, MIN_LEVERAGE,
};
use fusionamm_core::{
    sqrt_price_to_price, swap_quote_by_input_token, swap_quote_by_output_token, try_get_max_amount_with_slippage_tolerance,
    try_get_min_amount_with_slippage_tolerance, FusionPoolFacade, TickArrays,
};
use libm::{ceil, round};
use log::{debug, trace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

fn validate_leverage(leverage: f64) -> Result<(), QuoteError> {
    if !(MIN_LEVERAGE..=MAX_LEVERAGE).contains(&leverage) {
        return Err(QuoteError::InvalidLeverage);
    }
    Ok(())
}

fn validate_protocol_fee_rates(protocol_fee_rate: Percentage, protocol_fee_rate_on_collateral: Percentage) -> Result<(), QuoteError> {
    if protocol_fee_rate >= Percentage::HUNDRED || protocol_fee_rate_on_collateral >= Percentage::HUNDRED {
        return Err(QuoteError::ProtocolFeeRateOutOfRange);
    }
    Ok(())
}

/// Price of one unit of `token` expressed in the opposite token.
fn price_in_opposite_token(token: PoolToken, price: f64) -> f64 {
    if token.is_a() {
        price
    } else {
        1.0 / price
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IncreaseSpotPositionQuoteArgs {
    /** Position total size in the collateral_token. */
    pub increase_amount: u64,
    /** Collateral token. */
    pub collateral_token: PoolToken,
    /** Token of the position. */
    pub position_token: PoolToken,
    /** Leverage within [1.0, 100.0]. */
    pub leverage: f64,
    /** Slippage tolerance in basis points. DEFAULT_SLIPPAGE_TOLERANCE_BPS if not provided. */
    pub slippage_tolerance_bps: Option<u16>,
    /** Protocol fee rate on borrowed funds from a market account. */
    pub protocol_fee_rate: Percentage,
    /** Protocol fee rate on collateral from a market account. */
    pub protocol_fee_rate_on_collateral: Percentage,
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IncreaseSpotPositionQuoteResult {
    /** Required collateral amount */
    pub collateral: u64,
    /** Required amount to borrow */
    pub borrow: u64,
    /** Estimated position size in the position token. */
    pub estimated_amount: u64,
    /** Swap input amount. */
    pub swap_input_amount: u64,
    /** Minimum swap output amount according to the provided slippage. */
    pub min_swap_output_amount: u64,
    /** Protocol fee in token A */
    pub protocol_fee_a: u64,
    /** Protocol fee in token B */
    pub protocol_fee_b: u64,
    /** Price impact in percents (1% = 1.0) */
    pub price_impact: f64,
}

/// Spot position increase quote
///
/// The estimated amount is the increase amount valued in the position token at the current price.
/// The swap is simulated only for the slippage bound and the price impact.
///
/// # Parameters
/// - `args`: quote arguments.
/// - `fusion_pool`: Fusion pool.
/// - `tick_arrays`: Five tick arrays around the current pool price.
///
/// # Returns
/// - `IncreaseSpotPositionQuoteResult`: quote result
pub fn get_increase_spot_position_quote(
    args: IncreaseSpotPositionQuoteArgs,
    fusion_pool: FusionPoolFacade,
    tick_arrays: TickArrays,
) -> Result<IncreaseSpotPositionQuoteResult, QuoteError> {
    let IncreaseSpotPositionQuoteArgs {
        increase_amount,
        collateral_token,
        position_token,
        leverage,
        slippage_tolerance_bps,
        protocol_fee_rate,
        protocol_fee_rate_on_collateral,
    } = args;

    if increase_amount == 0 {
        return Err(QuoteError::ZeroAmount);
    }
    validate_leverage(leverage)?;
    validate_protocol_fee_rates(protocol_fee_rate, protocol_fee_rate_on_collateral)?;

    let swap_fee_rate = SwapFeeRate::from(fusion_pool.fee_rate);
    let price = sqrt_price_to_price(fusion_pool.sqrt_price.into(), 1, 1);
    let collateral_to_opposite_token_price = price_in_opposite_token(collateral_token, price);
    let slippage_tolerance_bps = slippage_tolerance_bps.unwrap_or(DEFAULT_SLIPPAGE_TOLERANCE_BPS);

    let borrowed_token = position_token.opposite();
    let borrow_in_collateral_token = ceil((increase_amount as f64 * (leverage - 1.0)) / leverage);

    let (collateral, borrow, swap_input_amount, estimated_amount) = if borrowed_token == collateral_token {
        // The collateral and the borrowed funds are swapped into the position token together.
        let borrow = borrow_in_collateral_token as u64;
        let borrow_with_fees_applied = apply_swap_fee(apply_tuna_protocol_fee(borrow, protocol_fee_rate, false)?, swap_fee_rate, false)?;

        let collateral = reverse_apply_swap_fee(increase_amount - borrow_with_fees_applied, swap_fee_rate, true)?;
        let collateral = reverse_apply_tuna_protocol_fee(collateral, protocol_fee_rate_on_collateral, true)?;

        let estimated_amount = round(increase_amount as f64 * collateral_to_opposite_token_price) as u64;
        (collateral, borrow, increase_amount, estimated_amount)
    } else {
        // Only the borrowed funds are swapped into the position token.
        let borrow = ceil(borrow_in_collateral_token * collateral_to_opposite_token_price) as u64;
        let borrow_with_fees_applied =
            apply_swap_fee(apply_tuna_protocol_fee(borrow_in_collateral_token as u64, protocol_fee_rate, false)?, swap_fee_rate, false)?;

        let collateral = reverse_apply_tuna_protocol_fee(increase_amount - borrow_with_fees_applied, protocol_fee_rate_on_collateral, true)?;

        let swap_input_amount = apply_tuna_protocol_fee(borrow, protocol_fee_rate, false)?;
        (collateral, borrow, swap_input_amount, increase_amount)
    };

    let protocol_fee = calculate_tuna_spot_position_protocol_fee(
        collateral_token,
        borrowed_token,
        collateral,
        borrow,
        protocol_fee_rate_on_collateral,
        protocol_fee_rate,
    )?;

    let mut min_swap_output_amount = 0;
    let mut price_impact = 0.0;

    if swap_input_amount > 0 {
        let quote = swap_quote_by_input_token(swap_input_amount, borrowed_token.is_a(), 0, fusion_pool, tick_arrays, None, None)?;
        min_swap_output_amount = try_get_min_amount_with_slippage_tolerance(quote.token_est_out, slippage_tolerance_bps)?;
        let new_price = sqrt_price_to_price(quote.next_sqrt_price.into(), 1, 1);
        price_impact = price_impact_percent(price, new_price);
    }

    debug!(
        "spot increase quote: collateral={}, borrow={}, swap_input={}, estimated_amount={}, price_impact={}%",
        collateral, borrow, swap_input_amount, estimated_amount, price_impact
    );

    Ok(IncreaseSpotPositionQuoteResult {
        collateral,
        borrow,
        estimated_amount,
        swap_input_amount,
        min_swap_output_amount,
        protocol_fee_a: protocol_fee.a,
        protocol_fee_b: protocol_fee.b,
        price_impact,
    })
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecreaseSpotPositionQuoteArgs {
    /** Position total decrease size in the collateral_token. */
    pub decrease_amount: u64,
    /** Collateral token. */
    pub collateral_token: PoolToken,
    /** Leverage of a position opened on the opposite side if the decrease exceeds the position. */
    pub leverage: f64,
    /** Slippage tolerance in basis points. DEFAULT_SLIPPAGE_TOLERANCE_BPS if not provided. */
    pub slippage_tolerance_bps: Option<u16>,
    /** Never decrease more than the existing position amount. */
    pub reduce_only: bool,
    /** Token of the existing position. */
    pub position_token: PoolToken,
    /** Existing position amount in the position_token. */
    pub position_amount: u64,
    /** Existing position debt in the token opposite to the position_token. */
    pub position_debt: u64,
    /** Protocol fee rate on borrowed funds from a market account. */
    pub protocol_fee_rate: Percentage,
    /** Protocol fee rate on collateral from a market account. */
    pub protocol_fee_rate_on_collateral: Percentage,
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecreaseSpotPositionQuoteResult {
    /** Position decrease percentage */
    pub decrease_percent: u32,
    /** Collateral token. */
    pub collateral_token: PoolToken,
    /** Token of the position after the operation. Differs from the existing one if the position is flipped. */
    pub position_token: PoolToken,
    /** Required collateral of the flipped position. */
    pub collateral: u64,
    /** Required amount to borrow for the flipped position. */
    pub borrow: u64,
    /** Total swap input amount in the existing position token. */
    pub swap_input_amount: u64,
    /** The maximum acceptable swap input amount for position decrease according to the provided slippage
     * (if collateral_token == position_token) OR the minimum swap output amount (if collateral_token != position_token).
     */
    pub required_swap_amount: u64,
    /** Estimated total amount of the adjusted position. */
    pub estimated_amount: u64,
    /** Estimated value of a debt that will be repaid. */
    pub estimated_payable_debt: u64,
    /** Estimated collateral that will be withdrawn from the position. */
    pub estimated_collateral_to_be_withdrawn: u64,
    /** Protocol fee in token A */
    pub protocol_fee_a: u64,
    /** Protocol fee in token B */
    pub protocol_fee_b: u64,
    /** Price impact in percents (1% = 1.0) */
    pub price_impact: f64,
}

/// Spot position decrease quote
///
/// A decrease larger than the position closes it and, unless `reduce_only` is set, opens a position
/// in the opposite token with the remainder.
///
/// # Parameters
/// - `args`: quote arguments.
/// - `fusion_pool`: Fusion pool.
/// - `tick_arrays`: Five tick arrays around the current pool price.
///
/// # Returns
/// - `DecreaseSpotPositionQuoteResult`: quote result
pub fn get_decrease_spot_position_quote(
    args: DecreaseSpotPositionQuoteArgs,
    fusion_pool: FusionPoolFacade,
    tick_arrays: TickArrays,
) -> Result<DecreaseSpotPositionQuoteResult, QuoteError> {
    let DecreaseSpotPositionQuoteArgs {
        decrease_amount,
        collateral_token,
        leverage,
        slippage_tolerance_bps,
        reduce_only,
        position_token,
        position_amount,
        position_debt,
        protocol_fee_rate,
        protocol_fee_rate_on_collateral,
    } = args;

    if decrease_amount == 0 {
        return Err(QuoteError::ZeroAmount);
    }
    if position_amount == 0 {
        return Err(QuoteError::EmptyPosition);
    }
    validate_leverage(leverage)?;
    validate_protocol_fee_rates(protocol_fee_rate, protocol_fee_rate_on_collateral)?;

    let price = sqrt_price_to_price(fusion_pool.sqrt_price.into(), 1, 1);
    let position_to_borrowed_token_price = price_in_opposite_token(position_token, price);
    let borrowed_token = position_token.opposite();
    let slippage_tolerance_bps = slippage_tolerance_bps.unwrap_or(DEFAULT_SLIPPAGE_TOLERANCE_BPS);

    let position_value_in_collateral_token = if collateral_token == position_token {
        position_amount
    } else {
        round(position_amount as f64 * position_to_borrowed_token_price) as u64
    };

    // The part of the decrease that opens a position in the opposite token.
    let flip_amount = if reduce_only {
        0
    } else {
        decrease_amount.saturating_sub(position_value_in_collateral_token)
    };

    let mut decrease_amount_in_position_token = if collateral_token == position_token {
        decrease_amount
    } else {
        round(decrease_amount as f64 / position_to_borrowed_token_price) as u64
    };

    decrease_amount_in_position_token = position_amount.min(decrease_amount_in_position_token);

    let mut decrease_percent =
        (mul_div_64(decrease_amount_in_position_token, HUNDRED_PERCENT as u64, position_amount, Rounding::Down)? as u32).min(HUNDRED_PERCENT);
    if flip_amount > 0 {
        decrease_percent = HUNDRED_PERCENT;
    }

    let estimated_amount = mul_div_64(position_amount, (HUNDRED_PERCENT - decrease_percent) as u64, HUNDRED_PERCENT as u64, Rounding::Down)?;
    let estimated_payable_debt = mul_div(position_debt, decrease_percent as u128, HUNDRED_PERCENT as u128, Rounding::Up)?;
    let mut estimated_collateral_to_be_withdrawn = 0;
    let mut required_swap_amount: u64 = 0;
    let mut swap_input_amount: u64 = 0;
    let mut next_sqrt_price = fusion_pool.sqrt_price;

    if collateral_token == position_token {
        if position_debt > 0 {
            let amount_out = mul_div_64(position_debt, decrease_percent as u64, HUNDRED_PERCENT as u64, Rounding::Down)?;
            if amount_out > 0 {
                let swap = swap_quote_by_output_token(amount_out, borrowed_token.is_a(), 0, fusion_pool, tick_arrays.clone(), None, None)?;
                next_sqrt_price = swap.next_sqrt_price;
                swap_input_amount = swap.token_est_in;
                required_swap_amount = try_get_max_amount_with_slippage_tolerance(swap.token_est_in, slippage_tolerance_bps)?;
            }
            estimated_collateral_to_be_withdrawn = position_amount.saturating_sub(swap_input_amount).saturating_sub(estimated_amount);
        } else {
            estimated_collateral_to_be_withdrawn = position_amount - estimated_amount;
        }
    } else {
        let amount_in = position_amount - estimated_amount;
        if amount_in > 0 {
            let swap = swap_quote_by_input_token(amount_in, position_token.is_a(), 0, fusion_pool, tick_arrays.clone(), None, None)?;
            next_sqrt_price = swap.next_sqrt_price;
            swap_input_amount = amount_in;
            required_swap_amount = try_get_min_amount_with_slippage_tolerance(swap.token_est_out, slippage_tolerance_bps)?;
            estimated_collateral_to_be_withdrawn = swap.token_est_out.saturating_sub(estimated_payable_debt);
        }
    }

    let new_price = sqrt_price_to_price(next_sqrt_price.into(), 1, 1);
    let price_impact = price_impact_percent(price, new_price);

    trace!(
        "spot decrease quote: decrease_percent={}, estimated_payable_debt={}, withdrawn={}",
        decrease_percent,
        estimated_payable_debt,
        estimated_collateral_to_be_withdrawn
    );

    if flip_amount == 0 {
        debug!("spot decrease quote: position {:?} decreased by {}/{}", position_token, decrease_percent, HUNDRED_PERCENT);

        return Ok(DecreaseSpotPositionQuoteResult {
            decrease_percent,
            collateral_token,
            position_token,
            collateral: 0,
            borrow: 0,
            swap_input_amount,
            required_swap_amount,
            estimated_amount,
            estimated_payable_debt,
            estimated_collateral_to_be_withdrawn,
            protocol_fee_a: 0,
            protocol_fee_b: 0,
            price_impact,
        });
    }

    // Both legs swap the existing position token, so their inputs and price impacts add up.
    let increase = get_increase_spot_position_quote(
        IncreaseSpotPositionQuoteArgs {
            increase_amount: flip_amount,
            collateral_token,
            position_token: borrowed_token,
            leverage,
            slippage_tolerance_bps: Some(slippage_tolerance_bps),
            protocol_fee_rate,
            protocol_fee_rate_on_collateral,
        },
        fusion_pool,
        tick_arrays,
    )?;

    debug!(
        "spot decrease quote: position {:?} closed and flipped to {:?} with {} of the collateral token",
        position_token, borrowed_token, flip_amount
    );

    Ok(DecreaseSpotPositionQuoteResult {
        decrease_percent,
        collateral_token,
        position_token: borrowed_token,
        collateral: increase.collateral,
        borrow: increase.borrow,
        swap_input_amount: swap_input_amount
            .checked_add(increase.swap_input_amount)
            .ok_or(QuoteError::ArithmeticOverflow)?,
        required_swap_amount,
        estimated_amount: increase.estimated_amount,
        estimated_payable_debt,
        estimated_collateral_to_be_withdrawn,
        protocol_fee_a: increase.protocol_fee_a,
        protocol_fee_b: increase.protocol_fee_b,
        price_impact: price_impact + increase.price_impact,
    })
}

/// Returns the liquidation price
///
/// # Parameters
/// - `position_token`: Token of the position
/// - `amount`: Position total size
/// - `debt`: Position total debt
/// - `liquidation_threshold`: Liquidation threshold of a market
///
/// # Returns
/// - `f64`: Decimal liquidation price
pub fn get_spot_position_liquidation_price(
    position_token: PoolToken,
    amount: u64,
    debt: u64,
    liquidation_threshold: Percentage,
) -> Result<f64, QuoteError> {
    if liquidation_threshold.is_zero() || liquidation_threshold >= Percentage::HUNDRED {
        return Err(QuoteError::InvalidLiquidationThreshold);
    }

    if debt == 0 || amount == 0 {
        return Ok(0.0);
    }

    let liquidation_threshold_f = liquidation_threshold.to_f64();

    if position_token.is_a() {
        Ok(debt as f64 / (amount as f64 * liquidation_threshold_f))
    } else {
        Ok((amount as f64 * liquidation_threshold_f) / debt as f64)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TradableAmountArgs {
    /** Collateral token. */
    pub collateral_token: PoolToken,
    /** Available wallet balance in the collateral_token. */
    pub available_balance: u64,
    /** Leverage within [1.0, 100.0]. */
    pub leverage: f64,
    /** Token of the existing position. Ignored if position_amount is zero. */
    pub position_token: PoolToken,
    /** Existing position amount in the position_token. */
    pub position_amount: u64,
    /** Existing position debt in the token opposite to the position_token. */
    pub position_debt: u64,
    /** Token of the position the user is trading towards. */
    pub new_position_token: PoolToken,
    /** Only closing the existing position is allowed. */
    pub reduce_only: bool,
    /** Protocol fee rate on borrowed funds from a market account. */
    pub protocol_fee_rate: Percentage,
    /** Protocol fee rate on collateral from a market account. */
    pub protocol_fee_rate_on_collateral: Percentage,
}

/// Calculates the maximum tradable amount in the collateral token.
///
/// # Parameters
/// - `args`: the wallet balance and the existing position.
/// - `fusion_pool`: Fusion pool.
/// - `tick_arrays`: Five tick arrays around the current pool price.
///
/// # Returns
/// - `u64`: the maximum tradable amount
pub fn get_tradable_amount(args: TradableAmountArgs, fusion_pool: FusionPoolFacade, tick_arrays: TickArrays) -> Result<u64, QuoteError> {
    let TradableAmountArgs {
        collateral_token,
        available_balance,
        leverage,
        position_token,
        position_amount,
        position_debt,
        new_position_token,
        reduce_only,
        protocol_fee_rate,
        protocol_fee_rate_on_collateral,
    } = args;

    validate_leverage(leverage)?;
    validate_protocol_fee_rates(protocol_fee_rate, protocol_fee_rate_on_collateral)?;

    let swap_fee_rate = SwapFeeRate::from(fusion_pool.fee_rate);

    // T = C⋅Fc⋅Fs + B⋅Fb⋅Fs, where: Fc/Fb/Fs - collateral/borrow/swap fee multiplier
    // B = T⋅(L - 1) / L
    // => T = C⋅Fc⋅Fs / (1 - Fb⋅Fs⋅(L - 1) / L)
    let add_leverage = |collateral: u64| -> Result<u64, QuoteError> {
        let mut collateral = apply_tuna_protocol_fee(collateral, protocol_fee_rate_on_collateral, false)?;
        if collateral_token != new_position_token {
            collateral = apply_swap_fee(collateral, swap_fee_rate, false)?;
        }

        let fee_multiplier = (1.0 - protocol_fee_rate.to_f64()) * (1.0 - swap_fee_rate.to_f64());
        let total = (collateral as f64 / (1.0 - (fee_multiplier * (leverage - 1.0)) / leverage)) as u64;
        Ok(total)
    };

    if position_amount == 0 || position_token == new_position_token {
        return add_leverage(available_balance);
    }

    let price = sqrt_price_to_price(fusion_pool.sqrt_price.into(), 1, 1);
    let position_to_opposite_token_price = price_in_opposite_token(position_token, price);

    let close_value = if collateral_token == position_token {
        position_amount
    } else {
        round(position_amount as f64 * position_to_opposite_token_price) as u64
    };

    if reduce_only {
        return Ok(close_value);
    }

    // Collateral released by closing the existing position, in the collateral token.
    let released_collateral = if collateral_token == position_token {
        if position_debt > 0 {
            let swap = swap_quote_by_output_token(position_debt, position_token.opposite().is_a(), 0, fusion_pool, tick_arrays, None, None)?;
            position_amount.saturating_sub(swap.token_est_in)
        } else {
            position_amount
        }
    } else {
        let swap = swap_quote_by_input_token(position_amount, position_token.is_a(), 0, fusion_pool, tick_arrays, None, None)?;
        swap.token_est_out.saturating_sub(position_debt)
    };

    let opened = add_leverage(available_balance.checked_add(released_collateral).ok_or(QuoteError::ArithmeticOverflow)?)?;

    debug!("tradable amount: close={}, released_collateral={}, open={}", close_value, released_collateral, opened);

    close_value.checked_add(opened).ok_or(QuoteError::ArithmeticOverflow)
}
