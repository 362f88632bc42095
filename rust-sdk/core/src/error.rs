use fusionamm_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum QuoteError {
    #[error("Incorrect position tick index order: the lower tick must not be greater than the upper tick")]
    IncorrectTickOrder,
    #[error("Max amount slippage must be within [0, HUNDRED_PERCENT]")]
    SlippageOutOfRange,
    #[error("Both collateral amounts can't be computed")]
    BothSidesComputed,
    #[error("sqrt_price must be greater than the lower sqrt price if the token A amount is computed")]
    PriceBelowRangeForComputedA,
    #[error("sqrt_price must be less than the upper sqrt price if the token B amount is computed")]
    PriceAboveRangeForComputedB,
    #[error("Leverage must be within [1.0, 100.0]")]
    InvalidLeverage,
    #[error("Protocol fee rate is out of range")]
    ProtocolFeeRateOutOfRange,
    #[error("Swap fee rate is out of range")]
    SwapFeeRateOutOfRange,
    #[error("Amount must be greater than zero")]
    ZeroAmount,
    #[error("Position amount can't be zero")]
    EmptyPosition,
    #[error("Liquidation threshold must be within (0, HUNDRED_PERCENT)")]
    InvalidLiquidationThreshold,
    #[error("The debt is greater than the total size")]
    DebtExceedsTotal,
    #[error("Position liquidity can't be zero")]
    ZeroLiquidity,
    #[error("Position debt is less than the repaid amount")]
    RepayExceedsDebt,
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
    #[error("{0}")]
    Core(CoreError),
}

impl From<CoreError> for QuoteError {
    fn from(err: CoreError) -> Self {
        QuoteError::Core(err)
    }
}
