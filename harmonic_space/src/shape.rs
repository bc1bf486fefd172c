// Searching a product set for transpositions of an interval shape.
//
// A shape is an ordered list of intervals above an implicit root. For every
// member of the product set taken as root, each interval is transposed onto
// it (root * interval, octave-reduced) and looked up in the set. A root
// matches when every transposed interval lands within epsilon of some member.
//
// Comparison is on octave-reduced ratio values, not cents, with an absolute
// tolerance. Distance wraps at the octave, so a transposition landing a hair
// under 2 still matches a member at 1.
//
// Shapes are plain `f64` intervals: a shape built from 12-TET semitones can
// be matched against a just-intonation product set, with epsilon deciding
// how close counts.

use crate::cps::CombinationProductSet;
use crate::error::{HarmonicError, Result};
use crate::octave::normalize_f64;
use crate::ratio::Ratio;
use serde::Serialize;

pub const DEFAULT_EPSILON: f64 = 1e-3;

/// Intervals above an implicit root.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Shape {
    intervals: Vec<f64>,
}

impl Shape {
    pub fn new(intervals: Vec<f64>) -> Result<Self> {
        if let Some(bad) = intervals.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
            return Err(HarmonicError::invalid("shape interval", bad));
        }
        Ok(Shape { intervals })
    }

    pub fn from_ratios(ratios: &[Ratio]) -> Self {
        Shape {
            intervals: ratios.iter().map(Ratio::value).collect(),
        }
    }

    /// 12-tone equal-tempered intervals, `2^(s/12)` for each semitone count.
    pub fn from_semitones(semitones: &[i32]) -> Self {
        Shape {
            intervals: semitones
                .iter()
                .map(|&s| 2f64.powf(s as f64 / 12.0))
                .collect(),
        }
    }

    pub fn intervals(&self) -> &[f64] {
        &self.intervals
    }
}

/// A root for which the whole shape was found.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShapeMatch {
    pub root_index: usize,
    pub root: f64,
    /// Octave-reduced `root * interval` for each shape interval.
    pub transposed: Vec<f64>,
    /// Index of the product-set member matched by each transposed interval.
    pub matched: Vec<usize>,
}

#[derive(Clone, Copy, Debug)]
pub struct ShapeMatcher {
    epsilon: f64,
}

impl Default for ShapeMatcher {
    fn default() -> Self {
        ShapeMatcher {
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl ShapeMatcher {
    pub fn new(epsilon: f64) -> Result<Self> {
        if !(epsilon.is_finite() && epsilon >= 0.0) {
            return Err(HarmonicError::invalid("shape tolerance", epsilon));
        }
        Ok(ShapeMatcher { epsilon })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Every root in `products` at which `shape` fits entirely.
    pub fn find(&self, products: &[f64], shape: &Shape) -> Result<Vec<ShapeMatch>> {
        let reduced = products
            .iter()
            .map(|&p| normalize_f64(p))
            .collect::<Result<Vec<f64>>>()?;

        let mut matches = Vec::new();
        'roots: for (root_index, &root) in reduced.iter().enumerate() {
            let mut transposed = Vec::with_capacity(shape.intervals.len());
            let mut matched = Vec::with_capacity(shape.intervals.len());
            for &interval in &shape.intervals {
                let target = normalize_f64(root * interval)?;
                match self.closest(&reduced, target) {
                    Some(j) => matched.push(j),
                    None => continue 'roots,
                }
                transposed.push(target);
            }
            matches.push(ShapeMatch {
                root_index,
                root,
                transposed,
                matched,
            });
        }
        tracing::debug!(
            roots = reduced.len(),
            matches = matches.len(),
            epsilon = self.epsilon,
            "shape search"
        );
        Ok(matches)
    }

    pub fn find_in_cps(
        &self,
        cps: &CombinationProductSet,
        shape: &Shape,
    ) -> Result<Vec<ShapeMatch>> {
        self.find(&cps.reduced_values(), shape)
    }

    /// Index of the member nearest `target`, if within epsilon.
    fn closest(&self, members: &[f64], target: f64) -> Option<usize> {
        members
            .iter()
            .enumerate()
            .map(|(i, &m)| (i, octave_distance(m, target)))
            .filter(|&(_, d)| d <= self.epsilon)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }
}

/// Distance between two values in [1, 2), treating 1 and 2 as the same point.
fn octave_distance(a: f64, b: f64) -> f64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    (hi - lo).min((2.0 * lo - hi).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hexany() -> CombinationProductSet {
        CombinationProductSet::hexany([1, 3, 5, 7]).unwrap()
    }

    fn shape(list: &[(i64, i64)]) -> Shape {
        let ratios: Vec<Ratio> = list.iter().map(|&(n, d)| Ratio::new(n, d).unwrap()).collect();
        Shape::from_ratios(&ratios)
    }

    #[test]
    fn major_triad_in_hexany() {
        let matches = ShapeMatcher::default()
            .find_in_cps(&hexany(), &shape(&[(1, 1), (5, 4), (3, 2)]))
            .unwrap();
        // Only 7 * {1, 5, 3} = {7, 35, 21} is a full 4:5:6 in this hexany.
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert!((m.root - 1.75).abs() < 1e-12);
        assert!((m.transposed[1] - 35.0 / 32.0).abs() < 1e-12);
        assert!((m.transposed[2] - 21.0 / 16.0).abs() < 1e-12);
        assert_eq!(m.matched[0], m.root_index);
    }

    #[test]
    fn minor_triad_in_hexany() {
        let matches = ShapeMatcher::default()
            .find_in_cps(&hexany(), &shape(&[(1, 1), (6, 5), (3, 2)]))
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert!((matches[0].root - 1.25).abs() < 1e-12);
    }

    #[test]
    fn equal_tempered_shape_needs_wider_tolerance() {
        let et_major = Shape::from_semitones(&[0, 4, 7]);
        let strict = ShapeMatcher::default().find_in_cps(&hexany(), &et_major).unwrap();
        assert!(strict.is_empty());

        let loose = ShapeMatcher::new(0.01)
            .unwrap()
            .find_in_cps(&hexany(), &et_major)
            .unwrap();
        assert_eq!(loose.len(), 1);
        assert!((loose[0].root - 1.75).abs() < 1e-12);
    }

    #[test]
    fn unison_shape_matches_every_root() {
        let cps = hexany();
        let matches = ShapeMatcher::default()
            .find_in_cps(&cps, &shape(&[(1, 1)]))
            .unwrap();
        assert_eq!(matches.len(), cps.len());
    }

    #[test]
    fn transposition_onto_the_octave_matches_unison() {
        // 12/11 * 11/6 = 2/1, which reduces to the member 1/1.
        let products = [1.0, 12.0 / 11.0];
        let matches = ShapeMatcher::default()
            .find(&products, &shape(&[(1, 1), (11, 6)]))
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].root_index, 1);
        assert_eq!(matches[0].matched, vec![1, 0]);
    }

    #[test]
    fn octave_distance_wraps() {
        assert!(octave_distance(1.0, 2.0 - 1e-15) < 1e-12);
        assert!(octave_distance(1.999, 1.0) < 2.1e-3);
        assert!((octave_distance(1.25, 1.5) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn invalid_inputs() {
        assert!(ShapeMatcher::new(-1.0).is_err());
        assert!(ShapeMatcher::new(f64::NAN).is_err());
        assert!(Shape::new(vec![1.0, 0.0]).is_err());
        assert!(ShapeMatcher::default()
            .find(&[1.5, -1.0], &Shape::from_semitones(&[0]))
            .is_err());
    }
}
