//! Exact non-negative fractions for segment boundaries
//!
//! Segment boundaries are always in `[0, 1]` and are compared and subtracted
//! exactly, so a tiny reduced fraction type over `u64` is all that is needed.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors that can occur while building or parsing a fraction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RatioError {
    #[error("denominator must be greater than 0")]
    ZeroDenominator,

    #[error("invalid fraction {0:?}")]
    Invalid(String),

    #[error("fraction arithmetic overflowed")]
    Overflow,
}

/// Greatest common divisor (Euclid)
pub(crate) fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

fn gcd_wide(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Least common multiple, `None` on overflow
pub(crate) fn checked_lcm(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / gcd(a, b)).checked_mul(b)
}

/// A reduced fraction `num / den`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    num: u64,
    den: u64,
}

impl Rational {
    pub const ZERO: Rational = Rational { num: 0, den: 1 };
    pub const ONE: Rational = Rational { num: 1, den: 1 };

    /// Create a fraction, reducing it to lowest terms
    pub fn new(num: u64, den: u64) -> Result<Self, RatioError> {
        if den == 0 {
            return Err(RatioError::ZeroDenominator);
        }
        let g = gcd(num, den).max(1);
        Ok(Self {
            num: num / g,
            den: den / g,
        })
    }

    pub fn numer(&self) -> u64 {
        self.num
    }

    pub fn denom(&self) -> u64 {
        self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// `self - other`, or `None` if the result would be negative or its
    /// reduced form does not fit in 64 bits
    pub fn checked_sub(&self, other: &Rational) -> Option<Rational> {
        let (a, b) = (u128::from(self.den), u128::from(other.den));
        let den = (a / gcd_wide(a, b)).checked_mul(b)?;
        let lhs = u128::from(self.num).checked_mul(den / a)?;
        let rhs = u128::from(other.num).checked_mul(den / b)?;
        let num = lhs.checked_sub(rhs)?;
        let g = gcd_wide(num, den).max(1);
        Some(Rational {
            num: u64::try_from(num / g).ok()?,
            den: u64::try_from(den / g).ok()?,
        })
    }

    /// `self / k`, reduced
    fn checked_div_int(&self, k: u64) -> Result<Rational, RatioError> {
        let den = self.den.checked_mul(k).ok_or(RatioError::Overflow)?;
        Rational::new(self.num, den)
    }

    /// `self * k` as an integer, or `None` if it is not one or overflows
    pub(crate) fn checked_scale(&self, k: u64) -> Option<u64> {
        if k % self.den != 0 {
            return None;
        }
        self.num.checked_mul(k / self.den)
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = u128::from(self.num) * u128::from(other.den);
        let rhs = u128::from(other.num) * u128::from(self.den);
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

fn parse_u64(s: &str, whole: &str) -> Result<u64, RatioError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RatioError::Invalid(whole.to_string()));
    }
    s.parse::<u64>().map_err(|_| RatioError::Overflow)
}

impl FromStr for Rational {
    type Err = RatioError;

    /// Accepts `a/b`, decimals like `0.25`, integers, and percentages of
    /// any of those like `25%` or `12.5%`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(percent) = s.strip_suffix('%') {
            return parse_plain(percent.trim(), s)?.checked_div_int(100);
        }

        parse_plain(s, s)
    }
}

/// Parse a fraction, decimal or integer; `whole` is the text reported on error
fn parse_plain(s: &str, whole: &str) -> Result<Rational, RatioError> {
    if let Some((num, den)) = s.split_once('/') {
        return Rational::new(parse_u64(num.trim(), whole)?, parse_u64(den.trim(), whole)?);
    }

    if let Some((int, frac)) = s.split_once('.') {
        let int = if int.is_empty() { 0 } else { parse_u64(int, whole)? };
        let digits = u32::try_from(frac.len()).map_err(|_| RatioError::Overflow)?;
        let den = 10u64.checked_pow(digits).ok_or(RatioError::Overflow)?;
        let frac = parse_u64(frac, whole)?;
        let num = int
            .checked_mul(den)
            .and_then(|n| n.checked_add(frac))
            .ok_or(RatioError::Overflow)?;
        return Rational::new(num, den);
    }

    Rational::new(parse_u64(s, whole)?, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduces() {
        let r = Rational::new(2, 4).unwrap();
        assert_eq!(r.numer(), 1);
        assert_eq!(r.denom(), 2);
        assert_eq!(Rational::new(0, 7).unwrap(), Rational::ZERO);
    }

    #[test]
    fn test_parse_forms() {
        let quarter = Rational::new(1, 4).unwrap();
        assert_eq!("1/4".parse::<Rational>().unwrap(), quarter);
        assert_eq!("2/8".parse::<Rational>().unwrap(), quarter);
        assert_eq!("0.25".parse::<Rational>().unwrap(), quarter);
        assert_eq!(".25".parse::<Rational>().unwrap(), quarter);
        assert_eq!("25%".parse::<Rational>().unwrap(), quarter);
        assert_eq!("1".parse::<Rational>().unwrap(), Rational::ONE);
        assert_eq!("100%".parse::<Rational>().unwrap(), Rational::ONE);
    }

    #[test]
    fn test_parse_fractional_percent() {
        assert_eq!("12.5%".parse::<Rational>().unwrap(), Rational::new(1, 8).unwrap());
        assert_eq!("33.3%".parse::<Rational>().unwrap(), Rational::new(333, 1000).unwrap());
        assert_eq!("1/3%".parse::<Rational>().unwrap(), Rational::new(1, 300).unwrap());
        assert_eq!("0.5 %".parse::<Rational>().unwrap(), Rational::new(1, 200).unwrap());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "1/0".parse::<Rational>(),
            Err(RatioError::ZeroDenominator)
        );
        assert!(matches!(
            "abc".parse::<Rational>(),
            Err(RatioError::Invalid(_))
        ));
        assert!(matches!(
            "12.5.1%".parse::<Rational>(),
            Err(RatioError::Invalid(_))
        ));
        assert!(matches!("%".parse::<Rational>(), Err(RatioError::Invalid(_))));
        assert!(matches!(
            "-1/4".parse::<Rational>(),
            Err(RatioError::Invalid(_))
        ));
        assert!(matches!("".parse::<Rational>(), Err(RatioError::Invalid(_))));
    }

    #[test]
    fn test_ordering_and_sub() {
        let third = Rational::new(1, 3).unwrap();
        let half = Rational::new(1, 2).unwrap();
        assert!(third < half);
        assert_eq!(half.checked_sub(&third), Some(Rational::new(1, 6).unwrap()));
        assert_eq!(third.checked_sub(&half), None);
    }

    #[test]
    fn test_sub_with_large_denominators() {
        // denominators near the top of the u64 range
        let a = Rational::new(1, u64::MAX / 3).unwrap();
        let b = Rational::new(1, u64::MAX).unwrap();
        assert_eq!(a.checked_sub(&b), Some(Rational::new(2, u64::MAX).unwrap()));

        // reduced difference does not fit: 20 / (4294967291 * 4294967311)
        let p = Rational::new(1, 4_294_967_291).unwrap();
        let q = Rational::new(1, 4_294_967_311).unwrap();
        assert_eq!(p.checked_sub(&q), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Rational::new(3, 6).unwrap().to_string(), "1/2");
        assert_eq!(Rational::ONE.to_string(), "1");
        assert_eq!(Rational::ZERO.to_string(), "0");
    }

    #[test]
    fn test_lcm() {
        assert_eq!(checked_lcm(4, 6), Some(12));
        assert_eq!(checked_lcm(1, 9), Some(9));
        assert_eq!(checked_lcm(u64::MAX, u64::MAX - 1), None);
    }
}
