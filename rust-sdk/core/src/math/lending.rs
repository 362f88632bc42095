use crate::{mul_div_64, QuoteError, Rounding, INTEREST_ACCRUE_MIN_INTERVAL};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Converts lending vault funds into shares. Funds and shares are equal while the vault is empty.
pub fn funds_to_shares(funds: u64, total_funds: u64, total_shares: u64, rounding: Rounding) -> Result<u64, QuoteError> {
    if total_funds > 0 {
        mul_div_64(funds, total_shares, total_funds, rounding)
    } else {
        Ok(funds)
    }
}

/// Converts lending vault shares into funds. Funds and shares are equal while the vault is empty.
pub fn shares_to_funds(shares: u64, total_funds: u64, total_shares: u64, rounding: Rounding) -> Result<u64, QuoteError> {
    if total_shares > 0 {
        mul_div_64(shares, total_funds, total_shares, rounding)
    } else {
        Ok(shares)
    }
}

/// Deposited and borrowed totals of a lending vault.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VaultTotals {
    pub deposited_funds: u64,
    pub deposited_shares: u64,
    pub borrowed_funds: u64,
    pub borrowed_shares: u64,
}

impl VaultTotals {
    pub fn get_utilization(&self) -> f64 {
        if self.deposited_funds > 0 {
            self.borrowed_funds as f64 / self.deposited_funds as f64
        } else {
            1.0
        }
    }

    pub fn calculate_deposited_shares(&self, funds: u64, rounding: Rounding) -> Result<u64, QuoteError> {
        funds_to_shares(funds, self.deposited_funds, self.deposited_shares, rounding)
    }

    pub fn calculate_deposited_funds(&self, shares: u64, rounding: Rounding) -> Result<u64, QuoteError> {
        shares_to_funds(shares, self.deposited_funds, self.deposited_shares, rounding)
    }

    pub fn calculate_borrowed_shares(&self, funds: u64, rounding: Rounding) -> Result<u64, QuoteError> {
        funds_to_shares(funds, self.borrowed_funds, self.borrowed_shares, rounding)
    }

    pub fn calculate_borrowed_funds(&self, shares: u64, rounding: Rounding) -> Result<u64, QuoteError> {
        shares_to_funds(shares, self.borrowed_funds, self.borrowed_shares, rounding)
    }
}

/// Returns a borrow rate multiplier according to the provided utilization of a vault. The returned value will be equal to:
///   * 0.25 at utilization 0%
///   * 1.0  at utilization 90%
///   * 4.0  at utilization 100%
/// # Parameters
/// - `utilization` Current utilization (1.0 is equal to 100%)
/// # Returns
/// Borrow rate multiplier.
pub fn borrow_rate_multiplier(utilization: f64) -> f64 {
    let target_utilization = 0.9;
    let k = 4.0;

    if utilization > 1.0 {
        k
    } else if utilization <= 0.0 {
        1.0 / k
    } else if utilization > target_utilization {
        (utilization - target_utilization) * (k - 1.0) / (1.0 - target_utilization) + 1.0
    } else {
        1.0 - (target_utilization - utilization) * (1.0 - 1.0 / k) / target_utilization
    }
}

/// Returns the sum of the first three terms of a Taylor expansion of e^r - 1, to approximate a
/// continuous compound interest rate.
pub fn compounded_interest_rate(r: f64) -> f64 {
    let t1 = r;
    let t2 = r * r / 2.0;
    let t3 = t2 * r / 3.0;
    t1 + t2 + t3
}

/// Estimates the interest the program accrues on the borrowed funds of a vault after `elapsed_seconds`.
///
/// # Parameters
/// - `vault`: Current vault totals.
/// - `interest_rate`: Base interest rate of the vault per second (before the utilization multiplier).
/// - `elapsed_seconds`: Seconds passed since the last accrual.
///
/// # Returns
/// - `u64`: Interest amount added to both borrowed and deposited funds.
pub fn estimate_accrued_interest(vault: &VaultTotals, interest_rate: f64, elapsed_seconds: u64) -> u64 {
    if vault.borrowed_funds == 0 || elapsed_seconds < INTEREST_ACCRUE_MIN_INTERVAL {
        return 0;
    }

    let interest_rate = interest_rate * borrow_rate_multiplier(vault.get_utilization());
    let interest = compounded_interest_rate(interest_rate * elapsed_seconds as f64);
    (interest * vault.borrowed_funds as f64) as u64
}
