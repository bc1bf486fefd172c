//! Property tests for the exact-arithmetic primitives.

use harmonic_space::basis::PrimeBasis;
use harmonic_space::factor::{factorize, reconstruct};
use harmonic_space::octave::{normalize_f64, normalize_ratio};
use harmonic_space::ratio::Ratio;
use proptest::prelude::*;

/// Products of 7-limit prime powers, small enough to stay in `i64`.
fn seven_limit_int() -> impl Strategy<Value = i64> {
    (0u32..12, 0u32..8, 0u32..6, 0u32..5)
        .prop_map(|(a, b, c, d)| 2i64.pow(a) * 3i64.pow(b) * 5i64.pow(c) * 7i64.pow(d))
}

proptest! {
    #[test]
    fn factorization_reconstructs(n in 1i64..5_000_000) {
        let factors = factorize(n).unwrap();
        prop_assert_eq!(reconstruct(&factors), Some(n as u128));
        for &p in factors.keys() {
            prop_assert!(harmonic_space::factor::is_prime(p));
        }
    }

    #[test]
    fn vector_round_trip(num in seven_limit_int(), den in seven_limit_int()) {
        let basis = PrimeBasis::limit(7).unwrap();
        let v = basis.ratio_to_vector(num, den).unwrap();
        let back = basis.vector_to_ratio(&v).unwrap();
        prop_assert_eq!(back, Ratio::new(num, den).unwrap());
    }

    #[test]
    fn octave_normalized_ratio_in_range(num in 1i64..1_000_000, den in 1i64..1_000_000) {
        let r = Ratio::new(num, den).unwrap();
        let v = normalize_ratio(&r).unwrap();
        prop_assert!(v.value() >= 1.0 && v.value() < 2.0);
        // v = r * 2^k for an integer k: the odd parts agree.
        prop_assert_eq!(v.odd_part(), r.odd_part());
    }

    #[test]
    fn octave_normalized_float_in_range(x in 1e-9f64..1e9) {
        let v = normalize_f64(x).unwrap();
        prop_assert!((1.0..2.0).contains(&v));
        let k = (x / v).log2();
        prop_assert!((k - k.round()).abs() < 1e-9);
    }
}
