// Exact prime factorization by trial division.
//
// This is the foundation of the engine: every ratio is ultimately handled as
// a map from prime to exponent. Trial division up to sqrt(n) is plenty for the
// small numerators and denominators of just-intonation intervals; whatever
// remains above 1 afterwards is itself prime.
//
// See also: `basis.rs`, which divides only by the basis primes when mapping a
// ratio to coordinates, and calls back here to name an unsupported prime.

use crate::error::{HarmonicError, Result};
use std::collections::BTreeMap;

/// Prime -> exponent, in ascending prime order.
pub type Factorization = BTreeMap<u64, u32>;

/// Factor a positive integer into primes.
///
/// `factorize(1)` is the empty map. Fails with `InvalidInput` for `n <= 0`.
pub fn factorize(n: i64) -> Result<Factorization> {
    if n <= 0 {
        return Err(HarmonicError::invalid("factorize", n));
    }
    Ok(factorize_u128(n as u128))
}

/// Factor an unsigned value. `0` and `1` both yield the empty map.
pub(crate) fn factorize_u128(mut n: u128) -> Factorization {
    let mut factors = Factorization::new();
    if n < 2 {
        return factors;
    }
    while n % 2 == 0 {
        *factors.entry(2).or_insert(0) += 1;
        n /= 2;
    }
    let mut p: u128 = 3;
    while p * p <= n {
        while n % p == 0 {
            *factors.entry(p as u64).or_insert(0) += 1;
            n /= p;
        }
        p += 2;
    }
    if n > 1 {
        *factors.entry(n as u64).or_insert(0) += 1;
    }
    factors
}

/// Multiply a factorization back out. `None` on overflow.
pub fn reconstruct(factors: &Factorization) -> Option<u128> {
    factors.iter().try_fold(1u128, |acc, (&p, &e)| {
        (p as u128).checked_pow(e).and_then(|pe| acc.checked_mul(pe))
    })
}

/// Smallest prime dividing `n`, or `None` for `n < 2`.
pub(crate) fn smallest_prime_factor(n: u128) -> Option<u128> {
    if n < 2 {
        return None;
    }
    if n % 2 == 0 {
        return Some(2);
    }
    let mut p: u128 = 3;
    while p * p <= n {
        if n % p == 0 {
            return Some(p);
        }
        p += 2;
    }
    Some(n)
}

pub fn is_prime(n: u64) -> bool {
    smallest_prime_factor(n as u128) == Some(n as u128)
}

/// All primes `<= limit`, ascending.
pub fn primes_up_to(limit: u64) -> Vec<u64> {
    (2..=limit).filter(|&n| is_prime(n)).collect()
}
