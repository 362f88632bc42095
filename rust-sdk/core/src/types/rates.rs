use crate::{HUNDRED_PERCENT, SWAP_FEE_RATE_DENOMINATOR};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rate represented as hundredths of a basis point (0.01% = 100, 100% = HUNDRED_PERCENT).
///
/// Protocol fee rates, slippages and liquidation thresholds use this scale.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Percentage(u32);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);
    pub const HUNDRED: Percentage = Percentage(HUNDRED_PERCENT);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / HUNDRED_PERCENT as f64
    }
}

impl From<u16> for Percentage {
    fn from(value: u16) -> Self {
        Self(value as u32)
    }
}

/// A pool swap fee rate in parts per million (1% = 10_000).
///
/// Not interchangeable with [`Percentage`]: the two scales belong to different programs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SwapFeeRate(u32);

impl SwapFeeRate {
    pub const ZERO: SwapFeeRate = SwapFeeRate(0);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SWAP_FEE_RATE_DENOMINATOR as f64
    }
}

impl From<u16> for SwapFeeRate {
    fn from(value: u16) -> Self {
        Self(value as u32)
    }
}
