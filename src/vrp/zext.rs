//! Arbitrary-precision integers extended with −∞ and +∞
//!
//! Interval endpoints live here. The order is total (−∞ < n < +∞ for every
//! finite n) and arithmetic saturates through the infinities with the usual
//! sign rules. The indeterminate forms ∞ − ∞ and 0 · ∞ have no sound
//! interval reading; reaching one means the interval bookkeeping is broken,
//! so both panic instead of producing a garbage bound.

use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, ParseBigIntError, Sign};
use num_traits::Zero;

/// An integer, −∞, or +∞. Ordering is derived: `NegInf < Int(_) < PosInf`,
/// finite values by numeric value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Z {
    NegInf,
    Int(BigInt),
    PosInf,
}

impl Z {
    pub fn zero() -> Z {
        Z::Int(BigInt::zero())
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, Z::Int(_))
    }

    pub fn is_infinite(&self) -> bool {
        !self.is_finite()
    }

    /// −1, 0, or +1. The infinities carry their sign.
    pub fn sign(&self) -> i8 {
        match self {
            Z::NegInf => -1,
            Z::PosInf => 1,
            Z::Int(n) => match n.sign() {
                Sign::Minus => -1,
                Sign::NoSign => 0,
                Sign::Plus => 1,
            },
        }
    }

    pub fn add(&self, other: &Z) -> Z {
        match (self, other) {
            (Z::Int(a), Z::Int(b)) => Z::Int(a + b),
            (Z::PosInf, Z::NegInf) | (Z::NegInf, Z::PosInf) => {
                panic!("undefined arithmetic: ∞ + -∞")
            }
            (Z::PosInf, _) | (_, Z::PosInf) => Z::PosInf,
            (Z::NegInf, _) | (_, Z::NegInf) => Z::NegInf,
        }
    }

    pub fn sub(&self, other: &Z) -> Z {
        self.add(&other.neg())
    }

    pub fn neg(&self) -> Z {
        match self {
            Z::NegInf => Z::PosInf,
            Z::PosInf => Z::NegInf,
            Z::Int(n) => Z::Int(-n),
        }
    }

    pub fn mul(&self, other: &Z) -> Z {
        match (self, other) {
            (Z::Int(a), Z::Int(b)) => Z::Int(a * b),
            _ => {
                let sign = self.sign() * other.sign();
                if sign == 0 {
                    panic!("undefined arithmetic: 0 · ∞");
                }
                if sign > 0 {
                    Z::PosInf
                } else {
                    Z::NegInf
                }
            }
        }
    }
}

impl From<i64> for Z {
    fn from(n: i64) -> Z {
        Z::Int(BigInt::from(n))
    }
}

impl From<BigInt> for Z {
    fn from(n: BigInt) -> Z {
        Z::Int(n)
    }
}

impl FromStr for Z {
    type Err = ParseBigIntError;

    fn from_str(s: &str) -> Result<Z, Self::Err> {
        Ok(Z::Int(BigInt::from_str(s)?))
    }
}

impl fmt::Display for Z {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Z::NegInf => write!(f, "-∞"),
            Z::PosInf => write!(f, "∞"),
            Z::Int(n) => write!(f, "{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn z(n: i64) -> Z {
        Z::from(n)
    }

    #[test]
    fn test_total_order() {
        assert!(Z::NegInf < z(i64::MIN));
        assert!(z(i64::MAX) < Z::PosInf);
        assert!(Z::NegInf < Z::PosInf);
        assert!(z(-3) < z(4));
        assert_eq!(Z::PosInf, Z::PosInf);
        assert_eq!(Z::NegInf, Z::NegInf);
    }

    #[test]
    fn test_add_saturates_through_infinities() {
        assert_eq!(z(2).add(&z(3)), z(5));
        assert_eq!(Z::PosInf.add(&z(-10)), Z::PosInf);
        assert_eq!(Z::NegInf.add(&z(10)), Z::NegInf);
        assert_eq!(Z::PosInf.add(&Z::PosInf), Z::PosInf);
    }

    #[test]
    fn test_sub_and_neg() {
        assert_eq!(z(2).sub(&z(5)), z(-3));
        assert_eq!(Z::PosInf.sub(&z(1)), Z::PosInf);
        assert_eq!(z(1).sub(&Z::PosInf), Z::NegInf);
        assert_eq!(Z::NegInf.neg(), Z::PosInf);
    }

    #[test]
    fn test_mul_sign_rules() {
        assert_eq!(z(-4).mul(&z(3)), z(-12));
        assert_eq!(Z::PosInf.mul(&z(-2)), Z::NegInf);
        assert_eq!(Z::NegInf.mul(&z(-2)), Z::PosInf);
        assert_eq!(Z::NegInf.mul(&Z::NegInf), Z::PosInf);
        assert_eq!(Z::NegInf.mul(&Z::PosInf), Z::NegInf);
        assert_eq!(z(0).mul(&z(7)), z(0));
    }

    #[test]
    #[should_panic(expected = "undefined arithmetic")]
    fn test_opposite_infinities_panic() {
        let _ = Z::PosInf.add(&Z::NegInf);
    }

    #[test]
    #[should_panic(expected = "undefined arithmetic")]
    fn test_zero_times_infinity_panics() {
        let _ = z(0).mul(&Z::PosInf);
    }

    #[test]
    fn test_decimal_string_construction() {
        let big: Z = "123456789012345678901234567890".parse().unwrap();
        assert!(big > z(i64::MAX));
        assert_eq!(big.to_string(), "123456789012345678901234567890");
        assert_eq!(Z::PosInf.to_string(), "∞");
    }
}
