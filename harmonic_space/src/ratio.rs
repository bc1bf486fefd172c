// Exact positive rationals.
//
// `Ratio` is always stored in lowest terms with a strictly positive numerator
// and denominator, so derived equality and hashing are value equality. Both
// parts are `u128`: a 13-limit lattice coordinate at moderate resolution
// already multiplies out beyond `u64`. Arithmetic that would leave the `u128`
// range reports `Overflow` instead of wrapping.
//
// Serialized as the string "p/q" (or "p" when q = 1), the same way the
// ratio is displayed, so JSON output reads like interval notation.

use crate::error::{HarmonicError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A positive rational number in lowest terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ratio {
    num: u128,
    den: u128,
}

impl Ratio {
    pub const UNISON: Ratio = Ratio { num: 1, den: 1 };
    pub const OCTAVE: Ratio = Ratio { num: 2, den: 1 };

    /// Build a ratio from signed parts. Both must be positive.
    pub fn new(num: i64, den: i64) -> Result<Self> {
        if num <= 0 {
            return Err(HarmonicError::invalid("ratio numerator", num));
        }
        if den <= 0 {
            return Err(HarmonicError::invalid("ratio denominator", den));
        }
        Self::from_parts(num as u128, den as u128)
    }

    /// Build a ratio from unsigned parts, reducing to lowest terms.
    pub fn from_parts(num: u128, den: u128) -> Result<Self> {
        if num == 0 || den == 0 {
            return Err(HarmonicError::invalid("ratio", format!("{num}/{den}")));
        }
        let g = gcd(num, den);
        Ok(Ratio {
            num: num / g,
            den: den / g,
        })
    }

    /// For literals already in lowest terms with nonzero parts.
    pub(crate) const fn new_const(num: u128, den: u128) -> Self {
        Ratio { num, den }
    }

    pub fn integer(n: u64) -> Result<Self> {
        Self::from_parts(n as u128, 1)
    }

    pub fn numer(&self) -> u128 {
        self.num
    }

    pub fn denom(&self) -> u128 {
        self.den
    }

    pub fn value(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Size of the interval in cents: `1200 * log2(ratio)`.
    pub fn cents(&self) -> f64 {
        1200.0 * self.log2()
    }

    pub fn log2(&self) -> f64 {
        (self.num as f64).log2() - (self.den as f64).log2()
    }

    /// Tenney height, `log2(num * den)`: a simple harmonic complexity measure.
    pub fn tenney_height(&self) -> f64 {
        (self.num as f64).log2() + (self.den as f64).log2()
    }

    pub fn recip(&self) -> Self {
        Ratio {
            num: self.den,
            den: self.num,
        }
    }

    pub fn checked_mul(&self, other: &Ratio) -> Result<Self> {
        // Cross-cancel first to keep intermediates small.
        let g1 = gcd(self.num, other.den);
        let g2 = gcd(other.num, self.den);
        let num = (self.num / g1)
            .checked_mul(other.num / g2)
            .ok_or(HarmonicError::Overflow { what: "ratio product" })?;
        let den = (self.den / g2)
            .checked_mul(other.den / g1)
            .ok_or(HarmonicError::Overflow { what: "ratio product" })?;
        Ok(Ratio { num, den })
    }

    pub fn checked_div(&self, other: &Ratio) -> Result<Self> {
        self.checked_mul(&other.recip())
    }

    /// Exact `floor(log2(self))`, computed on the integer parts.
    pub fn floor_log2(&self) -> i32 {
        let k = bit_len(self.num) as i32 - bit_len(self.den) as i32;
        // After aligning bit lengths, one comparison settles the floor.
        let below = if k >= 0 {
            self.num < (self.den << k)
        } else {
            (self.num << -k) < self.den
        };
        if below { k - 1 } else { k }
    }

    /// Multiply by `2^e` exactly.
    pub fn mul_pow2(&self, e: i32) -> Result<Self> {
        let (num, den) = if e >= 0 {
            (shl_exact(self.num, e as u32), Some(self.den))
        } else {
            (Some(self.num), shl_exact(self.den, e.unsigned_abs()))
        };
        match (num, den) {
            (Some(n), Some(d)) => Self::from_parts(n, d),
            _ => Err(HarmonicError::Overflow {
                what: "power-of-two scaling",
            }),
        }
    }

    /// The ratio with every factor of 2 removed.
    pub fn odd_part(&self) -> Self {
        Ratio {
            num: self.num >> self.num.trailing_zeros(),
            den: self.den >> self.den.trailing_zeros(),
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl FromStr for Ratio {
    type Err = HarmonicError;

    /// Parse `"p/q"` or a bare integer `"p"`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parse = |part: &str| {
            part.trim()
                .parse::<u128>()
                .map_err(|_| HarmonicError::invalid("ratio", s))
        };
        match s.split_once('/') {
            Some((n, d)) => Self::from_parts(parse(n)?, parse(d)?),
            None => Self::from_parts(parse(s)?, 1),
        }
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ratio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

pub(crate) fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn bit_len(x: u128) -> u32 {
    128 - x.leading_zeros()
}

fn shl_exact(x: u128, e: u32) -> Option<u128> {
    if e >= 128 || x.leading_zeros() < e {
        None
    } else {
        Some(x << e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduces_to_lowest_terms() {
        let r = Ratio::new(6, 4).unwrap();
        assert_eq!((r.numer(), r.denom()), (3, 2));
        assert_eq!(r.to_string(), "3/2");
    }

    #[test]
    fn rejects_non_positive_parts() {
        assert!(Ratio::new(0, 1).is_err());
        assert!(Ratio::new(3, -2).is_err());
    }

    #[test]
    fn perfect_fifth_cents() {
        let fifth = Ratio::new(3, 2).unwrap();
        assert!((fifth.cents() - 701.955).abs() < 1e-3);
    }

    #[test]
    fn tenney_height_of_simple_intervals() {
        let third = Ratio::new(5, 4).unwrap();
        assert!((third.tenney_height() - 20f64.log2()).abs() < 1e-12);
        assert_eq!(Ratio::UNISON.tenney_height(), 0.0);
        // Reduction happens first: 6/4 has the height of 3/2.
        let fifth = Ratio::new(6, 4).unwrap();
        assert!((fifth.tenney_height() - 6f64.log2()).abs() < 1e-12);
    }

    #[test]
    fn floor_log2_exact_at_boundaries() {
        assert_eq!(Ratio::new(1, 1).unwrap().floor_log2(), 0);
        assert_eq!(Ratio::new(2, 1).unwrap().floor_log2(), 1);
        assert_eq!(Ratio::new(3, 2).unwrap().floor_log2(), 0);
        assert_eq!(Ratio::new(1, 2).unwrap().floor_log2(), -1);
        assert_eq!(Ratio::new(2, 3).unwrap().floor_log2(), -1);
        assert_eq!(Ratio::new(1, 3).unwrap().floor_log2(), -2);
        assert_eq!(Ratio::new(15, 1).unwrap().floor_log2(), 3);
        assert_eq!(Ratio::new(16, 1).unwrap().floor_log2(), 4);
    }

    #[test]
    fn mul_pow2_cancels_twos() {
        let r = Ratio::new(9, 8).unwrap().mul_pow2(3).unwrap();
        assert_eq!(r, Ratio::integer(9).unwrap());
        let r = Ratio::new(5, 1).unwrap().mul_pow2(-2).unwrap();
        assert_eq!(r, Ratio::new(5, 4).unwrap());
    }

    #[test]
    fn mul_pow2_reports_overflow() {
        let big = Ratio::from_parts(u128::MAX / 3, 1).unwrap();
        assert!(matches!(
            big.mul_pow2(4),
            Err(HarmonicError::Overflow { .. })
        ));
    }

    #[test]
    fn product_cross_cancels() {
        let a = Ratio::new(3, 2).unwrap();
        let b = Ratio::new(4, 3).unwrap();
        assert_eq!(a.checked_mul(&b).unwrap(), Ratio::OCTAVE);
        assert_eq!(a.checked_div(&a).unwrap(), Ratio::UNISON);
    }

    #[test]
    fn parse_and_serialize() {
        let r: Ratio = "15/8".parse().unwrap();
        assert_eq!(r, Ratio::new(15, 8).unwrap());
        let r: Ratio = " 7 ".parse().unwrap();
        assert_eq!(r.to_string(), "7");
        assert!("3/0".parse::<Ratio>().is_err());
        assert!("abc".parse::<Ratio>().is_err());

        let json = serde_json::to_string(&Ratio::new(5, 4).unwrap()).unwrap();
        assert_eq!(json, "\"5/4\"");
        let back: Ratio = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Ratio::new(5, 4).unwrap());
    }

    #[test]
    fn odd_part_strips_octaves() {
        let r = Ratio::new(12, 5).unwrap().odd_part();
        assert_eq!(r, Ratio::new(3, 5).unwrap());
    }
}
