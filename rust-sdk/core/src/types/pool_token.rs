#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the two tokens of a pool.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PoolToken {
    A,
    B,
}

impl PoolToken {
    pub fn opposite(self) -> PoolToken {
        match self {
            PoolToken::A => PoolToken::B,
            PoolToken::B => PoolToken::A,
        }
    }

    pub fn is_a(self) -> bool {
        self == PoolToken::A
    }

    /// Splits an amount of this token into a pair (amount_a, amount_b).
    pub fn split(self, amount: u64) -> (u64, u64) {
        match self {
            PoolToken::A => (amount, 0),
            PoolToken::B => (0, amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite() {
        assert_eq!(PoolToken::A.opposite(), PoolToken::B);
        assert_eq!(PoolToken::B.opposite(), PoolToken::A);
    }

    #[test]
    fn test_split() {
        assert_eq!(PoolToken::A.split(5), (5, 0));
        assert_eq!(PoolToken::B.split(5), (0, 5));
    }
}
