// Prime bases and the ratio <-> exponent-vector mapping.
//
// A `PrimeBasis` is the ordered list of primes spanning a harmonic space;
// axis `i` belongs to `primes[i]`. A `Monzo` is an exponent vector over such a
// basis, so that the ratio it names is the product of `primes[i]^v[i]`.
//
// The mapping is strict: a ratio with a prime factor the basis lacks is an
// `UnsupportedPrimeFactor` error, never a silently truncated vector. That
// keeps `ratio_of(monzo_of(r)) == r` true for every accepted ratio.
//
// See also: `octave.rs` for normalizing monzos along the 2-axis,
// `lattice.rs`, which keys nodes by monzos over the non-octave primes.

use crate::error::{HarmonicError, Result};
use crate::factor::{is_prime, primes_up_to, smallest_prime_factor};
use crate::ratio::Ratio;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Exponent storage. Eight inline slots cover the 19-limit without spilling.
pub type Exponents = SmallVec<[i32; 8]>;

/// A prime-exponent vector. Its length is fixed by the basis it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Monzo(pub Exponents);

impl Monzo {
    pub fn zeros(len: usize) -> Self {
        Monzo(SmallVec::from_elem(0, len))
    }

    pub fn from_slice(exps: &[i32]) -> Self {
        Monzo(SmallVec::from_slice(exps))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }

    /// Largest absolute exponent on any axis (Chebyshev norm).
    pub fn max_abs(&self) -> u32 {
        self.0.iter().map(|e| e.unsigned_abs()).max().unwrap_or(0)
    }

    /// True when the vectors differ by exactly one step on exactly one axis.
    pub fn is_adjacent(&self, other: &Monzo) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let mut diff_axes = 0;
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            match (a - b).unsigned_abs() {
                0 => {}
                1 => diff_axes += 1,
                _ => return false,
            }
        }
        diff_axes == 1
    }
}

impl fmt::Display for Monzo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{e}")?;
        }
        write!(f, ")")
    }
}

/// An ordered set of distinct primes; one lattice axis per entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u64>", into = "Vec<u64>")]
pub struct PrimeBasis {
    primes: Vec<u64>,
}

impl PrimeBasis {
    /// Validate and wrap a list of primes. Order is preserved.
    pub fn new(primes: Vec<u64>) -> Result<Self> {
        for (i, &p) in primes.iter().enumerate() {
            if !is_prime(p) {
                return Err(HarmonicError::invalid("prime basis entry", p));
            }
            if primes[..i].contains(&p) {
                return Err(HarmonicError::invalid("duplicate prime in basis", p));
            }
        }
        Ok(PrimeBasis { primes })
    }

    /// Every prime up to and including `limit`, octave axis first.
    ///
    /// `limit(5)` is the 5-limit basis `[2, 3, 5]`.
    pub fn limit(limit: u64) -> Result<Self> {
        if limit < 2 {
            return Err(HarmonicError::invalid("prime limit", limit));
        }
        Ok(PrimeBasis {
            primes: primes_up_to(limit),
        })
    }

    pub fn primes(&self) -> &[u64] {
        &self.primes
    }

    pub fn len(&self) -> usize {
        self.primes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primes.is_empty()
    }

    pub fn index_of(&self, prime: u64) -> Option<usize> {
        self.primes.iter().position(|&p| p == prime)
    }

    pub fn octave_axis(&self) -> Option<usize> {
        self.index_of(2)
    }

    /// The same basis with the prime-2 axis removed (lattice axes).
    pub fn without_octave(&self) -> Self {
        PrimeBasis {
            primes: self.primes.iter().copied().filter(|&p| p != 2).collect(),
        }
    }

    /// The basis with a prime-2 axis prepended if it lacks one.
    pub fn with_octave(&self) -> Self {
        if self.octave_axis().is_some() {
            return self.clone();
        }
        let mut primes = Vec::with_capacity(self.primes.len() + 1);
        primes.push(2);
        primes.extend_from_slice(&self.primes);
        PrimeBasis { primes }
    }

    /// Map `num/den` onto this basis.
    pub fn ratio_to_vector(&self, num: i64, den: i64) -> Result<Monzo> {
        self.monzo_of(&Ratio::new(num, den)?)
    }

    /// Exponent vector of a ratio: exponents of the numerator minus those of
    /// the denominator, one entry per basis prime.
    pub fn monzo_of(&self, ratio: &Ratio) -> Result<Monzo> {
        let mut exps = Monzo::zeros(self.len());
        for (part, sign) in [(ratio.numer(), 1), (ratio.denom(), -1)] {
            let mut rest = part;
            for (axis, &p) in self.primes.iter().enumerate() {
                let p = p as u128;
                while rest % p == 0 {
                    exps.0[axis] += sign;
                    rest /= p;
                }
            }
            if let Some(prime) = smallest_prime_factor(rest) {
                return Err(HarmonicError::UnsupportedPrimeFactor {
                    prime,
                    ratio: ratio.to_string(),
                });
            }
        }
        Ok(exps)
    }

    /// Rebuild the ratio named by an exponent vector over this basis.
    pub fn vector_to_ratio(&self, monzo: &Monzo) -> Result<Ratio> {
        if monzo.len() != self.len() {
            return Err(HarmonicError::invalid(
                "exponent vector length",
                format!("{} for basis of {}", monzo.len(), self.len()),
            ));
        }
        let overflow = || HarmonicError::Overflow {
            what: "exponent vector to ratio",
        };
        let mut num: u128 = 1;
        let mut den: u128 = 1;
        for (&p, &e) in self.primes.iter().zip(monzo.0.iter()) {
            let pe = (p as u128).checked_pow(e.unsigned_abs()).ok_or_else(overflow)?;
            if e > 0 {
                num = num.checked_mul(pe).ok_or_else(overflow)?;
            } else if e < 0 {
                den = den.checked_mul(pe).ok_or_else(overflow)?;
            }
        }
        Ratio::from_parts(num, den)
    }

    /// `log2` of the ratio a monzo names, computed from the exponents alone.
    pub fn log2_of(&self, monzo: &Monzo) -> f64 {
        self.primes
            .iter()
            .zip(monzo.0.iter())
            .map(|(&p, &e)| e as f64 * (p as f64).log2())
            .sum()
    }
}

impl TryFrom<Vec<u64>> for PrimeBasis {
    type Error = HarmonicError;

    fn try_from(primes: Vec<u64>) -> Result<Self> {
        PrimeBasis::new(primes)
    }
}

impl From<PrimeBasis> for Vec<u64> {
    fn from(basis: PrimeBasis) -> Self {
        basis.primes
    }
}

impl fmt::Display for PrimeBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.primes.iter().map(|p| p.to_string()).collect();
        write!(f, "<{}>", names.join(", "))
    }
}
