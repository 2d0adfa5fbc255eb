use serde::{Deserialize, Serialize};

use crate::error::{Result, RiskError};

/// Default spacing between curve thresholds, in the input's currency unit.
pub const DEFAULT_THRESHOLD_STEP: u64 = 2;

/// Upper bound on curve points; wider loss ranges get a coarser step.
pub const MAX_CURVE_POINTS: u64 = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub threshold: f64,
    /// P(loss > threshold).
    pub probability: f64,
}

/// Empirical loss exceedance curve over a fixed sample.
///
/// Thresholds are strictly increasing integers starting at 0 and
/// probabilities are non-increasing. The curve of a portfolio is not a
/// function of its risks' curves: summing samples trial by trial and then
/// building one curve is not the same as combining per-risk curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceedanceCurve {
    points: Vec<CurvePoint>,
    step: u64,
    /// Largest loss in the sample the curve was built from.
    max_loss: f64,
}

impl ExceedanceCurve {
    /// Build the curve at thresholds 0, step, 2·step, … below floor(max).
    ///
    /// A sample whose maximum is below 1 yields no such threshold; the curve
    /// is then the single point at 0 instead of being empty. When the range
    /// would need more than [`MAX_CURVE_POINTS`] thresholds the step is
    /// widened to `ceil(floor(max) / MAX_CURVE_POINTS)` and [`Self::step`]
    /// reports the step actually used.
    pub fn build(sample: &[f64], step: u64) -> Result<Self> {
        if sample.is_empty() {
            return Err(RiskError::Input("exceedance curve: empty sample".to_string()));
        }
        if step == 0 {
            return Err(RiskError::Input(
                "exceedance curve: threshold step must be > 0".to_string(),
            ));
        }
        if let Some(x) = sample.iter().find(|x| !x.is_finite()) {
            return Err(RiskError::Input(format!("exceedance curve: non-finite loss {x}")));
        }

        let mut sorted = sample.to_vec();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len() as f64;
        let max_loss = sorted[sorted.len() - 1];
        let end = (max_loss.floor().max(0.0) as u64).max(1);
        let step = step.max(end.div_ceil(MAX_CURVE_POINTS));

        let points = (0..end)
            .step_by(step as usize)
            .map(|t| {
                let threshold = t as f64;
                // Values <= threshold form a prefix of the sorted sample.
                let at_or_below = sorted.partition_point(|&x| x <= threshold);
                CurvePoint {
                    threshold,
                    probability: (sorted.len() - at_or_below) as f64 / n,
                }
            })
            .collect();

        Ok(ExceedanceCurve { points, step, max_loss })
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn max_loss(&self) -> f64 {
        self.max_loss
    }

    pub fn thresholds(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.threshold).collect()
    }

    pub fn probabilities(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.probability).collect()
    }

    /// Exceedance probability at the computed threshold nearest `threshold`.
    ///
    /// Nothing in the sample exceeds its own maximum, so any query at or
    /// above `max_loss` is 0. Ties between two neighbours go to the lower one.
    pub fn probability_at(&self, threshold: f64) -> f64 {
        if threshold >= self.max_loss {
            return 0.0;
        }
        let idx = self.points.partition_point(|p| p.threshold < threshold);
        let nearest = match (idx.checked_sub(1).map(|i| &self.points[i]), self.points.get(idx)) {
            (Some(lo), Some(hi)) => {
                if threshold - lo.threshold <= hi.threshold - threshold { lo } else { hi }
            }
            (Some(lo), None) => lo,
            (None, Some(hi)) => hi,
            (None, None) => return 0.0,
        };
        nearest.probability
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn thresholds_step_by_two_below_floor_of_max() {
        let curve = ExceedanceCurve::build(&[1.0, 3.0, 5.0, 9.5], 2).unwrap();
        assert_eq!(curve.thresholds(), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
        assert_eq!(curve.probabilities(), vec![1.0, 0.75, 0.5, 0.25, 0.25]);
        assert_eq!(curve.max_loss(), 9.5);
    }

    #[test]
    fn probability_at_zero_is_fraction_of_positive_losses() {
        let curve = ExceedanceCurve::build(&[0.0, 0.0, 0.0, 4.0, 12.0], 2).unwrap();
        assert_eq!(curve.points()[0].threshold, 0.0);
        assert!((curve.points()[0].probability - 0.4).abs() < 1e-12);
    }

    #[test]
    fn ties_at_threshold_do_not_exceed() {
        // 2.0 is not strictly greater than threshold 2.
        let curve = ExceedanceCurve::build(&[2.0, 2.0, 2.0, 6.0], 2).unwrap();
        assert_eq!(curve.probabilities(), vec![1.0, 0.25, 0.25]);
    }

    #[test]
    fn small_max_degenerates_to_single_point() {
        let curve = ExceedanceCurve::build(&[0.0, 0.5, 1.5], 2).unwrap();
        assert_eq!(curve.points().len(), 1);
        assert_eq!(curve.points()[0].threshold, 0.0);
        assert!((curve.points()[0].probability - 2.0 / 3.0).abs() < 1e-12);

        let zeros = ExceedanceCurve::build(&[0.0; 10], 2).unwrap();
        assert_eq!(zeros.points(), &[CurvePoint { threshold: 0.0, probability: 0.0 }]);
    }

    #[test]
    fn empty_sample_and_zero_step_are_input_errors() {
        assert!(matches!(ExceedanceCurve::build(&[], 2), Err(RiskError::Input(_))));
        assert!(matches!(ExceedanceCurve::build(&[1.0], 0), Err(RiskError::Input(_))));
        assert!(matches!(ExceedanceCurve::build(&[f64::NAN], 2), Err(RiskError::Input(_))));
    }

    #[test]
    fn probability_at_uses_nearest_threshold() {
        let curve = ExceedanceCurve::build(&[1.0, 3.0, 5.0, 9.5], 2).unwrap();
        assert_eq!(curve.probability_at(2.0), 0.75);
        assert_eq!(curve.probability_at(2.9), 0.75);
        assert_eq!(curve.probability_at(3.1), 0.5);
        assert_eq!(curve.probability_at(-5.0), 1.0);
        assert_eq!(curve.probability_at(9.0), 0.25);
        assert_eq!(curve.probability_at(9.5), 0.0);
        assert_eq!(curve.probability_at(3_000.0), 0.0);
    }

    /// Risk A always loses 10, risk B always loses 0 or 10 with equal
    /// weight. Per-risk P(>5) are 1.0 and 0.5, yet the summed portfolio
    /// exceeds 15 half the time, which no per-risk curve records.
    #[test]
    fn curves_do_not_compose_across_risks() {
        let a = vec![10.0; 4];
        let b = vec![0.0, 10.0, 0.0, 10.0];
        let total: Vec<f64> = a.iter().zip(&b).map(|(x, y)| x + y).collect();

        let ca = ExceedanceCurve::build(&a, 2).unwrap();
        let cb = ExceedanceCurve::build(&b, 2).unwrap();
        let ct = ExceedanceCurve::build(&total, 2).unwrap();

        assert_eq!(ca.probability_at(16.0), 0.0);
        assert_eq!(cb.probability_at(16.0), 0.0);
        assert_eq!(ct.probability_at(16.0), 0.5);
        assert_ne!(
            ct.probability_at(4.0),
            ca.probability_at(4.0) + cb.probability_at(4.0)
        );
    }

    #[test]
    fn wide_range_widens_step() {
        let curve = ExceedanceCurve::build(&[0.0, 1.0e16], 2).unwrap();
        let pts = curve.points();
        assert!(pts.len() as u64 <= MAX_CURVE_POINTS, "{} points", pts.len());
        assert_eq!(curve.step(), 200_000_000_000);
        assert_eq!(pts[0], CurvePoint { threshold: 0.0, probability: 0.5 });
        for w in pts.windows(2) {
            assert!(w[1].threshold > w[0].threshold);
            assert!(w[1].probability <= w[0].probability);
        }
        assert_eq!(curve.probability_at(3_000.0), 0.5);
        assert_eq!(curve.probability_at(1.0e16), 0.0);
    }

    #[test]
    fn step_kept_when_range_is_tractable() {
        let curve = ExceedanceCurve::build(&[0.0, 99_999.0], 2).unwrap();
        assert_eq!(curve.step(), 2);
        assert_eq!(curve.points().len(), 50_000);
    }

    proptest! {
        #[test]
        fn curve_is_non_increasing_and_bounded(
            sample in prop::collection::vec(0.0f64..500.0, 1..300),
            step in 1u64..10,
        ) {
            let curve = ExceedanceCurve::build(&sample, step).unwrap();
            let pts = curve.points();
            prop_assert!(!pts.is_empty());
            prop_assert_eq!(pts[0].threshold, 0.0);
            for w in pts.windows(2) {
                prop_assert!(w[1].threshold > w[0].threshold);
                prop_assert!(w[1].probability <= w[0].probability);
            }
            for p in pts {
                prop_assert!((0.0..=1.0).contains(&p.probability));
            }
            let positive = sample.iter().filter(|&&x| x > 0.0).count() as f64;
            prop_assert!((pts[0].probability - positive / sample.len() as f64).abs() < 1e-12);
        }
    }
}
