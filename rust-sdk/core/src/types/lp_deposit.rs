#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The amounts a user deposits into one side of a liquidity position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LpDeposit {
    /// Explicit collateral and borrow amounts of the token.
    Amounts { collateral: u64, borrow: u64 },
    /// Both amounts are derived from the other token's deposit and the current price.
    Computed,
}

impl LpDeposit {
    pub fn new(collateral: u64, borrow: u64) -> Self {
        LpDeposit::Amounts { collateral, borrow }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, LpDeposit::Computed)
    }

    /// Returns (collateral, borrow), treating a computed deposit as empty.
    pub fn amounts(&self) -> (u64, u64) {
        match *self {
            LpDeposit::Amounts { collateral, borrow } => (collateral, borrow),
            LpDeposit::Computed => (0, 0),
        }
    }
}
