// Combination Product Sets (Wilson CPS).
//
// A CPS multiplies together every k-element subset of n distinct factors and
// octave-reduces each product. The familiar named structures are just
// particular (n, k): {1,3,5,7} taken 2 at a time is the 6-note Hexany,
// {1,3,5,7,9,11} taken 3 at a time is the 20-note Eikosany.
//
// Subsets are enumerated with the combinatorial number system: rank
// 0..C(n,k) is unranked directly into a k-subset in colexicographic order.
// This is iterative, deterministic, and visits each subset exactly once.
//
// See also: `shape.rs`, which searches a CPS's reduced ratios for
// transpositions of an interval shape.

use crate::error::{HarmonicError, Result};
use crate::octave::normalize_ratio;
use crate::ratio::Ratio;
use serde::Serialize;

/// Binomial coefficient C(n, k), or `None` on overflow.
pub fn binomial(n: usize, k: usize) -> Option<u128> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        // acc * (n - i) / (i + 1) stays integral at every step.
        acc = acc.checked_mul((n - i) as u128)? / (i as u128 + 1);
    }
    Some(acc)
}

/// The k-subset of `0..n` with colexicographic rank `rank`, ascending.
///
/// `rank` must be below `C(n, k)`.
pub fn unrank_combination(rank: u128, n: usize, k: usize) -> Vec<usize> {
    let mut out = vec![0; k];
    let mut rest = rank;
    let mut c = n;
    for i in (1..=k).rev() {
        c -= 1;
        // Largest c with C(c, i) <= rest. C(c, i) is 0 once c < i.
        while binomial(c, i).is_none_or(|b| b > rest) {
            c -= 1;
        }
        rest -= binomial(c, i).unwrap_or(0);
        out[i - 1] = c;
    }
    out
}

/// One k-subset and its products.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CpsMember {
    /// The chosen factors, in input order.
    pub subset: Vec<u64>,
    /// Product before octave reduction.
    pub product: u128,
    /// Product reduced into [1, 2).
    pub ratio: Ratio,
}

#[derive(Clone, Debug, Serialize)]
pub struct CombinationProductSet {
    factors: Vec<u64>,
    k: usize,
    members: Vec<CpsMember>,
}

impl CombinationProductSet {
    /// All `C(n, k)` products of `k` of the given distinct positive factors.
    pub fn new(factors: &[u64], k: usize) -> Result<Self> {
        let n = factors.len();
        if k < 1 || k > n {
            return Err(HarmonicError::InvalidCombinationParameters { n, k });
        }
        for (i, &f) in factors.iter().enumerate() {
            if f == 0 {
                return Err(HarmonicError::invalid("CPS factor", f));
            }
            if factors[..i].contains(&f) {
                return Err(HarmonicError::invalid("duplicate CPS factor", f));
            }
        }

        let count = binomial(n, k).ok_or(HarmonicError::Overflow {
            what: "CPS member count",
        })?;
        let mut members = Vec::with_capacity(usize::try_from(count).unwrap_or(0));
        for rank in 0..count {
            let subset: Vec<u64> = unrank_combination(rank, n, k)
                .into_iter()
                .map(|i| factors[i])
                .collect();
            let product = subset
                .iter()
                .try_fold(1u128, |acc, &f| acc.checked_mul(f as u128))
                .ok_or(HarmonicError::Overflow { what: "CPS product" })?;
            let ratio = normalize_ratio(&Ratio::from_parts(product, 1)?)?;
            members.push(CpsMember {
                subset,
                product,
                ratio,
            });
        }

        tracing::debug!(n, k, members = members.len(), "built combination product set");
        Ok(CombinationProductSet {
            factors: factors.to_vec(),
            k,
            members,
        })
    }

    /// The 2-out-of-4 set.
    pub fn hexany(factors: [u64; 4]) -> Result<Self> {
        Self::new(&factors, 2)
    }

    /// The 3-out-of-6 set.
    pub fn eikosany(factors: [u64; 6]) -> Result<Self> {
        Self::new(&factors, 3)
    }

    pub fn factors(&self) -> &[u64] {
        &self.factors
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn members(&self) -> &[CpsMember] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Traditional name for this (n, k), if it has one.
    pub fn name(&self) -> Option<&'static str> {
        match (self.factors.len(), self.k) {
            (4, 2) => Some("hexany"),
            (5, 2) | (5, 3) => Some("dekany"),
            (6, 2) | (6, 4) => Some("pentadekany"),
            (6, 3) => Some("eikosany"),
            (8, 4) => Some("hebdomekontany"),
            _ => None,
        }
    }

    pub fn ratios(&self) -> Vec<Ratio> {
        self.members.iter().map(|m| m.ratio).collect()
    }

    /// Reduced ratios as floats, in enumeration order.
    pub fn reduced_values(&self) -> Vec<f64> {
        self.members.iter().map(|m| m.ratio.value()).collect()
    }

    /// Members ordered by ascending pitch within the octave.
    pub fn sorted_by_pitch(&self) -> Vec<&CpsMember> {
        let mut sorted: Vec<&CpsMember> = self.members.iter().collect();
        sorted.sort_by(|a, b| a.ratio.value().total_cmp(&b.ratio.value()));
        sorted
    }
}
