use crate::QuoteError;

uint::construct_uint! {
    pub struct U256(4);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rounding {
    Up,
    Down,
}

impl Rounding {
    pub fn from_round_up(round_up: bool) -> Self {
        if round_up {
            Rounding::Up
        } else {
            Rounding::Down
        }
    }
}

/// Computes x * y / d for 64-bit operands using a 128-bit intermediate.
pub fn mul_div_64(x: u64, y: u64, d: u64, rounding: Rounding) -> Result<u64, QuoteError> {
    let x_128 = x as u128;
    let y_128 = y as u128;
    let d_128 = d as u128;

    if d_128 == 0 {
        return Err(QuoteError::ArithmeticOverflow);
    }

    let result = match rounding {
        Rounding::Up => (x_128 * y_128)
            .checked_add(d_128 - 1)
            .ok_or(QuoteError::ArithmeticOverflow)?
            / d_128,
        Rounding::Down => (x_128 * y_128) / d_128,
    };

    result.try_into().map_err(|_| QuoteError::ArithmeticOverflow)
}

/// Computes x * y / d using a 256-bit intermediate, so any u128 multiplier is safe.
pub fn mul_div(x: u64, y: u128, d: u128, rounding: Rounding) -> Result<u64, QuoteError> {
    if d == 0 {
        return Err(QuoteError::ArithmeticOverflow);
    }

    let d_256 = U256::from(d);
    let product = U256::from(x) * U256::from(y);

    let result = match rounding {
        Rounding::Up => (product + d_256 - U256::one()) / d_256,
        Rounding::Down => product / d_256,
    };

    u64::try_from(result).map_err(|_| QuoteError::ArithmeticOverflow)
}
