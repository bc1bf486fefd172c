// Octave normalization into the canonical range [1, 2).
//
// Every path here computes `k = floor(log2(x))` once and scales by `2^-k` in
// a single step, adjusting the exponent of 2 directly. Nothing loops on
// "multiply or divide by two until in range", which drifts in floating
// point when applied repeatedly.
//
// - `normalize_ratio`: exact, on integer parts.
// - `normalize_monzo`: rewrites the prime-2 exponent of a vector.
// - `normalize_f64`: for decimal ratios such as 12-TET intervals; scaling a
//   float by a power of two is exact, so this is drift-free as well.

use crate::basis::{Monzo, PrimeBasis};
use crate::error::{HarmonicError, Result};
use crate::ratio::Ratio;

/// Reduce a ratio into [1, 2).
pub fn normalize_ratio(ratio: &Ratio) -> Result<Ratio> {
    ratio.mul_pow2(-ratio.floor_log2())
}

/// Reduce an exponent vector into [1, 2) by rewriting its 2-exponent.
///
/// The basis must contain the prime 2.
pub fn normalize_monzo(monzo: &Monzo, basis: &PrimeBasis) -> Result<Monzo> {
    let two = basis
        .octave_axis()
        .ok_or_else(|| HarmonicError::invalid("octave normalization basis", basis))?;
    let floor = match basis.vector_to_ratio(monzo) {
        Ok(ratio) => ratio.floor_log2(),
        // Too large to multiply out exactly; the odd part of a monzo is
        // never a power of two, so the float sum sits safely off-integer.
        Err(HarmonicError::Overflow { .. }) => basis.log2_of(monzo).floor() as i32,
        Err(e) => return Err(e),
    };
    let mut out = monzo.clone();
    out.0[two] -= floor;
    Ok(out)
}

/// Reduce a positive float into [1, 2).
pub fn normalize_f64(x: f64) -> Result<f64> {
    if !(x.is_finite() && x > 0.0) {
        return Err(HarmonicError::invalid("ratio value", x));
    }
    let k = x.log2().floor() as i32;
    let mut v = x * 2f64.powi(-k);
    // log2 can round across an integer for values a hair from a power of two.
    if v >= 2.0 {
        v /= 2.0;
    } else if v < 1.0 {
        v *= 2.0;
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_land_in_octave() {
        let cases = [(3, 1, 3, 2), (1, 3, 4, 3), (5, 1, 5, 4), (9, 4, 9, 8), (2, 1, 1, 1)];
        for (n, d, en, ed) in cases {
            let r = normalize_ratio(&Ratio::new(n, d).unwrap()).unwrap();
            assert_eq!(r, Ratio::new(en, ed).unwrap(), "{n}/{d}");
        }
    }

    #[test]
    fn monzo_normalization_rewrites_two_axis() {
        let basis = PrimeBasis::limit(5).unwrap();
        // 15 = 3 * 5 -> 15/8
        let m = Monzo::from_slice(&[0, 1, 1]);
        let n = normalize_monzo(&m, &basis).unwrap();
        assert_eq!(n.as_slice(), &[-3, 1, 1]);
        assert_eq!(
            basis.vector_to_ratio(&n).unwrap(),
            Ratio::new(15, 8).unwrap()
        );
    }

    #[test]
    fn monzo_normalization_needs_octave_axis() {
        let basis = PrimeBasis::new(vec![3, 5]).unwrap();
        let m = Monzo::from_slice(&[1, 0]);
        assert!(matches!(
            normalize_monzo(&m, &basis),
            Err(HarmonicError::InvalidInput { .. })
        ));
    }

    #[test]
    fn huge_monzo_falls_back_to_log_sum() {
        let basis = PrimeBasis::limit(3).unwrap();
        // 3^100 does not fit in u128.
        let m = Monzo::from_slice(&[0, 100]);
        let n = normalize_monzo(&m, &basis).unwrap();
        let cents = basis.log2_of(&n) * 1200.0;
        assert!((0.0..1200.0).contains(&cents), "{cents}");
    }

    #[test]
    fn floats_land_in_octave() {
        for x in [0.001, 0.5, 1.0, 1.5, 2.0, 3.0, 1023.9, 1e9] {
            let v = normalize_f64(x).unwrap();
            assert!((1.0..2.0).contains(&v), "{x} -> {v}");
        }
        assert!(normalize_f64(0.0).is_err());
        assert!(normalize_f64(-2.0).is_err());
        assert!(normalize_f64(f64::NAN).is_err());
    }
}
