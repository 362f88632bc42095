/// The scale of protocol fee rates, slippages and liquidation thresholds (hundredths of a basis point).
pub const HUNDRED_PERCENT: u32 = 1_000_000;

/// The scale of pool swap fee rates (parts per million).
pub const SWAP_FEE_RATE_DENOMINATOR: u32 = 1_000_000;

/// Used by the liquidity increase quote when no slippage is provided.
pub const DEFAULT_MAX_AMOUNT_SLIPPAGE: u32 = HUNDRED_PERCENT / 2;

/// Used by the spot position quotes when no slippage tolerance is provided.
pub const DEFAULT_SLIPPAGE_TOLERANCE_BPS: u16 = 100;

pub const MIN_LEVERAGE: f64 = 1.0;
pub const MAX_LEVERAGE: f64 = 100.0;

/// The program doesn't accrue interest more often than once per this interval (seconds).
pub const INTEREST_ACCRUE_MIN_INTERVAL: u64 = 60;
