use crate::{
    apply_swap_fee, calculate_tuna_protocol_fee, mul_div, sqrt_price_x64_to_price_x64, LpDeposit, Percentage, PoolToken, QuoteError, Rounding, SwapFeeRate,
    DEFAULT_MAX_AMOUNT_SLIPPAGE, HUNDRED_PERCENT, SWAP_FEE_RATE_DENOMINATOR,
};
use fixed::types::U64F64;
use fusionamm_core::{
    get_amount_a_from_liquidity, get_amount_b_from_liquidity, get_amounts_from_liquidity, get_liquidity_from_amount_a, get_liquidity_from_amount_b,
    get_liquidity_from_amounts, position_ratio_x64, tick_index_to_sqrt_price, Q64_RESOLUTION,
};
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LiquidationPrices {
    pub lower: f64,
    pub upper: f64,
}

/// Range bounds of a position as floating sqrt prices.
#[derive(Copy, Clone)]
struct SqrtPriceBounds {
    lower: f64,
    upper: f64,
}

impl SqrtPriceBounds {
    fn from_x64(lower_sqrt_price: u128, upper_sqrt_price: u128) -> Self {
        Self {
            lower: lower_sqrt_price as f64 / Q64_RESOLUTION,
            upper: upper_sqrt_price as f64 / Q64_RESOLUTION,
        }
    }
}

/// Debt, idle balances and threshold of a position, as floats for the closed-form solvers.
///
/// A position is liquidated once `t * value == debt`, with both sides valued in token B.
#[derive(Copy, Clone)]
struct DebtExposure {
    threshold: f64,
    leftovers_a: f64,
    leftovers_b: f64,
    debt_a: f64,
    debt_b: f64,
}

impl DebtExposure {
    /// Liquidation sqrt prices while the position is in range.
    ///
    /// In range the liquidity holds `L(1/√P - 1/u)` of A and `L(√P - l)` of B, so the threshold
    /// condition is a quadratic in √P. A root outside the range is reported as 0.
    fn solve_in_range(&self, liquidity: f64, bounds: SqrtPriceBounds) -> (f64, f64) {
        let t = self.threshold;
        let a = self.debt_a + t * (liquidity / bounds.upper - self.leftovers_a);
        let b = -2.0 * t * liquidity;
        let c = self.debt_b + t * (liquidity * bounds.lower - self.leftovers_b);
        let d = b * b - 4.0 * a * c;

        if d < 0.0 {
            return (0.0, 0.0);
        }

        let lower_root = (-b - d.sqrt()) / (2.0 * a);
        let upper_root = (-b + d.sqrt()) / (2.0 * a);

        let lower = if lower_root >= 0.0 && lower_root >= bounds.lower { lower_root } else { 0.0 };
        let upper = if upper_root >= 0.0 && upper_root <= bounds.upper { upper_root } else { 0.0 };
        (lower, upper)
    }

    /// Liquidation price once the liquidity is entirely converted into `token`.
    ///
    /// Below the range the liquidity is `amount` of A, above it `amount` of B.
    /// Both cases are linear in P. A vanishing denominator has no solution and yields 0.
    fn solve_out_of_range(&self, token: PoolToken, amount: u64) -> f64 {
        if amount == 0 {
            return 0.0;
        }

        let t = self.threshold;
        let (numerator, denominator) = match token {
            PoolToken::A => (self.debt_b - t * self.leftovers_b, t * (amount as f64 + self.leftovers_a) - self.debt_a),
            PoolToken::B => (t * (amount as f64 + self.leftovers_b) - self.debt_b, self.debt_a - t * self.leftovers_a),
        };

        if denominator == 0.0 {
            return 0.0;
        }
        numerator / denominator
    }
}

/// Computes the liquidation prices for an existing position.
///
/// Each side is solved in range first. When no in-range solution exists, the price is solved for
/// the position fully converted into token A (lower side) or token B (upper side).
/// A side without a liquidation price is reported as 0.
pub fn get_lp_position_liquidation_prices(
    tick_lower_index: i32,
    tick_upper_index: i32,
    liquidity: u128,
    leftovers_a: u64,
    leftovers_b: u64,
    debt_a: u64,
    debt_b: u64,
    liquidation_threshold: Percentage,
) -> Result<LiquidationPrices, QuoteError> {
    if tick_lower_index > tick_upper_index {
        return Err(QuoteError::IncorrectTickOrder);
    }

    if liquidation_threshold >= Percentage::HUNDRED {
        return Err(QuoteError::InvalidLiquidationThreshold);
    }

    let lower_sqrt_price = tick_index_to_sqrt_price(tick_lower_index);
    let upper_sqrt_price = tick_index_to_sqrt_price(tick_upper_index);
    let bounds = SqrtPriceBounds::from_x64(lower_sqrt_price, upper_sqrt_price);

    let exposure = DebtExposure {
        threshold: liquidation_threshold.to_f64(),
        leftovers_a: leftovers_a as f64,
        leftovers_b: leftovers_b as f64,
        debt_a: debt_a as f64,
        debt_b: debt_b as f64,
    };

    let (lower_in_range, upper_in_range) = exposure.solve_in_range(liquidity as f64, bounds);

    let lower = if lower_in_range > 0.0 {
        lower_in_range * lower_in_range
    } else {
        let amount_a = get_amount_a_from_liquidity(liquidity, lower_sqrt_price, upper_sqrt_price, false)?;
        let price = exposure.solve_out_of_range(PoolToken::A, amount_a);
        if price >= 0.0 && price <= bounds.lower * bounds.lower {
            price
        } else {
            0.0
        }
    };

    let upper = if upper_in_range > 0.0 {
        upper_in_range * upper_in_range
    } else {
        let amount_b = get_amount_b_from_liquidity(liquidity, lower_sqrt_price, upper_sqrt_price, false)?;
        let price = exposure.solve_out_of_range(PoolToken::B, amount_b);
        if price >= 0.0 && price >= bounds.upper * bounds.upper {
            price
        } else {
            0.0
        }
    };

    debug!("liquidation prices: lower={}, upper={}", lower, upper);

    Ok(LiquidationPrices { lower, upper })
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IncreaseLpPositionQuoteArgs {
    /// Collateral and borrow in token A, or computed from the token B deposit.
    pub deposit_a: LpDeposit,
    /// Collateral and borrow in token B, or computed from the token A deposit.
    pub deposit_b: LpDeposit,
    /// Protocol fee rate on borrowed funds from a market account.
    pub protocol_fee_rate: Percentage,
    /// Protocol fee rate on collateral from a market account.
    pub protocol_fee_rate_on_collateral: Percentage,
    /// The swap fee rate of a pool denominated in 1e6.
    pub swap_fee_rate: SwapFeeRate,
    /// Maximum allowed deviation of the deposited amounts. Zero selects DEFAULT_MAX_AMOUNT_SLIPPAGE.
    pub max_amount_slippage: Percentage,
    /// Current sqrt price.
    pub sqrt_price: u128,
    /// Position lower tick index.
    pub tick_lower_index: i32,
    /// Position upper tick index.
    pub tick_upper_index: i32,
    /// The liquidation threshold of the market.
    pub liquidation_threshold: Percentage,
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IncreaseLpPositionQuoteResult {
    pub collateral_a: u64,
    pub collateral_b: u64,
    /// Upper bound of token A collateral the user should authorize.
    pub max_collateral_a: u64,
    /// Upper bound of token B collateral the user should authorize.
    pub max_collateral_b: u64,
    pub borrow_a: u64,
    pub borrow_b: u64,
    /// Estimated amount of token A in the position.
    pub total_a: u64,
    /// Estimated amount of token B in the position.
    pub total_b: u64,
    /// Minimum amount of token A the program must put into the position.
    pub min_total_a: u64,
    /// Minimum amount of token B the program must put into the position.
    pub min_total_b: u64,
    pub swap_input: u64,
    pub swap_output: u64,
    pub swap_a_to_b: bool,
    pub protocol_fee_a: u64,
    pub protocol_fee_b: u64,
    pub liquidity: u128,
    pub leverage: f64,
    pub liquidation_lower_price: f64,
    pub liquidation_upper_price: f64,
}

fn split_proportionally(amount: u64, part: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    ((amount as u128 * part as u128) / total as u128) as u64
}

fn checked_sum(a: u64, b: u64) -> Result<u64, QuoteError> {
    a.checked_add(b).ok_or(QuoteError::ArithmeticOverflow)
}

/// Liquidity position increase quote.
///
/// Resolves a computed deposit side, charges the protocol fee, estimates the rebalancing swap
/// for the position range and returns the bounds the increase instruction should enforce.
pub fn get_increase_lp_position_quote(args: IncreaseLpPositionQuoteArgs) -> Result<IncreaseLpPositionQuoteResult, QuoteError> {
    let sqrt_price = args.sqrt_price;

    if args.tick_lower_index > args.tick_upper_index {
        return Err(QuoteError::IncorrectTickOrder);
    }

    if args.max_amount_slippage > Percentage::HUNDRED {
        return Err(QuoteError::SlippageOutOfRange);
    }

    if args.protocol_fee_rate > Percentage::HUNDRED || args.protocol_fee_rate_on_collateral > Percentage::HUNDRED {
        return Err(QuoteError::ProtocolFeeRateOutOfRange);
    }

    if args.swap_fee_rate.value() > SWAP_FEE_RATE_DENOMINATOR {
        return Err(QuoteError::SwapFeeRateOutOfRange);
    }

    if args.deposit_a.is_computed() && args.deposit_b.is_computed() {
        return Err(QuoteError::BothSidesComputed);
    }

    let max_amount_slippage = if args.max_amount_slippage.is_zero() {
        Percentage::new(DEFAULT_MAX_AMOUNT_SLIPPAGE)
    } else {
        args.max_amount_slippage
    };

    let lower_sqrt_price = tick_index_to_sqrt_price(args.tick_lower_index);
    let upper_sqrt_price = tick_index_to_sqrt_price(args.tick_upper_index);

    let (mut collateral_a, mut borrow_a) = args.deposit_a.amounts();
    let (mut collateral_b, mut borrow_b) = args.deposit_b.amounts();

    if args.deposit_a.is_computed() {
        if sqrt_price <= lower_sqrt_price {
            return Err(QuoteError::PriceBelowRangeForComputedA);
        } else if sqrt_price < upper_sqrt_price {
            let amount_b = checked_sum(collateral_b, borrow_b)?;
            let liquidity = get_liquidity_from_amount_b(amount_b, lower_sqrt_price, sqrt_price)?;
            let amount_a = get_amount_a_from_liquidity(liquidity, sqrt_price, upper_sqrt_price, false)?;
            collateral_a = split_proportionally(amount_a, collateral_b, amount_b);
            borrow_a = amount_a - collateral_a;
        }
    } else if args.deposit_b.is_computed() {
        if sqrt_price >= upper_sqrt_price {
            return Err(QuoteError::PriceAboveRangeForComputedB);
        } else if sqrt_price > lower_sqrt_price {
            let amount_a = checked_sum(collateral_a, borrow_a)?;
            let liquidity = get_liquidity_from_amount_a(amount_a, sqrt_price, upper_sqrt_price)?;
            let amount_b = get_amount_b_from_liquidity(liquidity, lower_sqrt_price, sqrt_price, false)?;
            collateral_b = split_proportionally(amount_b, collateral_a, amount_a);
            borrow_b = amount_b - collateral_b;
        }
    }

    let protocol_fee_a = calculate_tuna_protocol_fee(collateral_a, borrow_a, args.protocol_fee_rate_on_collateral, args.protocol_fee_rate)?;
    let provided_a = checked_sum(collateral_a, borrow_a)? - protocol_fee_a;

    let protocol_fee_b = calculate_tuna_protocol_fee(collateral_b, borrow_b, args.protocol_fee_rate_on_collateral, args.protocol_fee_rate)?;
    let provided_b = checked_sum(collateral_b, borrow_b)? - protocol_fee_b;

    let mut swap_input = 0;
    let mut swap_output = 0;
    let mut swap_a_to_b = false;
    let mut total_a = provided_a;
    let mut total_b = provided_b;

    if !args.deposit_a.is_computed() && !args.deposit_b.is_computed() {
        let position_ratio = position_ratio_x64(sqrt_price.into(), args.tick_lower_index, args.tick_upper_index);
        let ratio_a = position_ratio.ratio_a as f64 / Q64_RESOLUTION;
        let ratio_b = position_ratio.ratio_b as f64 / Q64_RESOLUTION;

        let price = (sqrt_price as f64 / Q64_RESOLUTION).powf(2.0);

        // Estimated total position size.
        let mut total = (provided_a as f64 * price + provided_b as f64) as u64;
        total_a = (total as f64 * ratio_a / price) as u64;
        total_b = (total as f64 * ratio_b) as u64;

        let mut fee_a = 0;
        let mut fee_b = 0;

        if total_a < provided_a {
            swap_input = provided_a - total_a;
            fee_a = swap_input - apply_swap_fee(swap_input, args.swap_fee_rate, false)?;
            swap_output = ((swap_input - fee_a) as f64 * price) as u64;
            swap_a_to_b = true;
        } else if total_b < provided_b {
            swap_input = provided_b - total_b;
            fee_b = swap_input - apply_swap_fee(swap_input, args.swap_fee_rate, false)?;
            swap_output = ((swap_input - fee_b) as f64 / price) as u64;
            swap_a_to_b = false;
        }

        // Recompute totals with applied swap fee.
        total = ((provided_a - fee_a) as f64 * price) as u64 + provided_b - fee_b;
        total_a = ((total as f64 * ratio_a) / price) as u64;
        total_b = (total as f64 * ratio_b) as u64;
    }

    let slippage = max_amount_slippage.value() as u128;
    let min_total_a = total_a - mul_div(total_a, slippage, HUNDRED_PERCENT as u128, Rounding::Down)?;
    let min_total_b = total_b - mul_div(total_b, slippage, HUNDRED_PERCENT as u128, Rounding::Down)?;
    let max_collateral_a = checked_sum(collateral_a, mul_div(collateral_a, slippage, HUNDRED_PERCENT as u128, Rounding::Down)?)?;
    let max_collateral_b = checked_sum(collateral_b, mul_div(collateral_b, slippage, HUNDRED_PERCENT as u128, Rounding::Down)?)?;

    debug!(
        "lp increase quote: collateral=({}, {}), borrow=({}, {}), total=({}, {}), swap_input={}, swap_a_to_b={}",
        collateral_a, collateral_b, borrow_a, borrow_b, total_a, total_b, swap_input, swap_a_to_b
    );

    let liquidity = get_liquidity_from_amounts(sqrt_price, lower_sqrt_price, upper_sqrt_price, total_a, total_b)?;
    let liquidation_prices = get_lp_position_liquidation_prices(
        args.tick_lower_index,
        args.tick_upper_index,
        liquidity,
        0,
        0,
        borrow_a,
        borrow_b,
        args.liquidation_threshold,
    )?;

    let leverage = compute_leverage(total_a, total_b, borrow_a, borrow_b, sqrt_price)?;

    Ok(IncreaseLpPositionQuoteResult {
        collateral_a,
        collateral_b,
        max_collateral_a,
        max_collateral_b,
        borrow_a,
        borrow_b,
        total_a,
        total_b,
        min_total_a,
        min_total_b,
        swap_input,
        swap_output,
        swap_a_to_b,
        protocol_fee_a,
        protocol_fee_b,
        liquidity,
        leverage,
        liquidation_lower_price: liquidation_prices.lower,
        liquidation_upper_price: liquidation_prices.upper,
    })
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RepayLpPositionDebtQuoteArgs {
    /** The position liquidity */
    pub liquidity: u128,
    /** The current debt of a position in token A. */
    pub debt_a: u64,
    /** The current debt of a position in token B. */
    pub debt_b: u64,
    /** The leftovers of a position in token A. */
    pub leftovers_a: u64,
    /** The leftovers of a position in token B. */
    pub leftovers_b: u64,
    /** Position lower tick index. */
    pub tick_lower_index: i32,
    /** Position upper tick index. */
    pub tick_upper_index: i32,
    /** The amount of token A to repay. */
    pub repay_a: u64,
    /** The amount of token B to repay. */
    pub repay_b: u64,
    /** Current sqrt price. */
    pub sqrt_price: u128,
    /** The liquidation threshold of the market. */
    pub liquidation_threshold: Percentage,
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RepayLpPositionDebtQuoteResult {
    pub debt_a: u64,
    pub debt_b: u64,
    pub leverage: f64,
    pub liquidation_lower_price: f64,
    pub liquidation_upper_price: f64,
}

pub fn get_repay_lp_position_debt_quote(args: RepayLpPositionDebtQuoteArgs) -> Result<RepayLpPositionDebtQuoteResult, QuoteError> {
    if args.liquidity == 0 {
        return Err(QuoteError::ZeroLiquidity);
    }

    let debt_a = args.debt_a.checked_sub(args.repay_a).ok_or(QuoteError::RepayExceedsDebt)?;
    let debt_b = args.debt_b.checked_sub(args.repay_b).ok_or(QuoteError::RepayExceedsDebt)?;

    let liquidation_prices = get_lp_position_liquidation_prices(
        args.tick_lower_index,
        args.tick_upper_index,
        args.liquidity,
        args.leftovers_a,
        args.leftovers_b,
        debt_a,
        debt_b,
        args.liquidation_threshold,
    )?;

    let lower_sqrt_price = tick_index_to_sqrt_price(args.tick_lower_index);
    let upper_sqrt_price = tick_index_to_sqrt_price(args.tick_upper_index);

    let total = get_amounts_from_liquidity(args.liquidity, args.sqrt_price, lower_sqrt_price, upper_sqrt_price, false)?;
    let leverage = compute_leverage(
        checked_sum(total.a, args.leftovers_a)?,
        checked_sum(total.b, args.leftovers_b)?,
        debt_a,
        debt_b,
        args.sqrt_price,
    )?;

    Ok(RepayLpPositionDebtQuoteResult {
        debt_a,
        debt_b,
        leverage,
        liquidation_lower_price: liquidation_prices.lower,
        liquidation_upper_price: liquidation_prices.upper,
    })
}

/// Values a pair of token amounts in token B, with A converted at `price` and rounded down.
fn value_in_token_b(amount_a: u64, amount_b: u64, price: U64F64) -> Result<u64, QuoteError> {
    let amount_a_in_b: u64 = U64F64::from(amount_a)
        .checked_mul(price)
        .ok_or(QuoteError::ArithmeticOverflow)?
        .checked_to_num()
        .ok_or(QuoteError::ArithmeticOverflow)?;
    checked_sum(amount_a_in_b, amount_b)
}

/// Returns total / (total - debt), both valued in token B at the given price.
/// An empty position has a leverage of 1.
pub fn compute_leverage(total_a: u64, total_b: u64, debt_a: u64, debt_b: u64, sqrt_price: u128) -> Result<f64, QuoteError> {
    let price = sqrt_price_x64_to_price_x64(sqrt_price)?;
    let total = value_in_token_b(total_a, total_b, price)?;
    let debt = value_in_token_b(debt_a, debt_b, price)?;

    if total == 0 {
        return Ok(1.0);
    }

    let equity = total.checked_sub(debt).filter(|equity| *equity > 0).ok_or(QuoteError::DebtExceedsTotal)?;
    Ok(total as f64 / equity as f64)
}
