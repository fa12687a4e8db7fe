//! Exponential smoothing over monthly totals

#[derive(Debug, Clone)]
pub struct SmoothingEstimator {
    alpha: f64,
}

impl Default for SmoothingEstimator {
    fn default() -> Self {
        Self::new(crate::config::SMOOTHING_ALPHA)
    }
}

impl SmoothingEstimator {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }

    /// Final smoothed level of chronological `totals` (0 when empty)
    pub fn smooth(&self, totals: &[f64]) -> f64 {
        let Some((first, rest)) = totals.split_first() else {
            return 0.0;
        };

        rest.iter()
            .fold(*first, |level, y| self.alpha * y + (1.0 - self.alpha) * level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_single() {
        let smoother = SmoothingEstimator::default();
        assert_eq!(smoother.smooth(&[]), 0.0);
        assert_eq!(smoother.smooth(&[42.0]), 42.0);
    }

    #[test]
    fn test_smoothing_sequence() {
        // S0 = 100, S1 = 0.3*200 + 0.7*100 = 130, S2 = 0.3*100 + 0.7*130 = 121
        let smoother = SmoothingEstimator::default();
        assert!((smoother.smooth(&[100.0, 200.0, 100.0]) - 121.0).abs() < 1e-9);
    }

    #[test]
    fn test_alpha_one_tracks_last_value() {
        let smoother = SmoothingEstimator::new(1.0);
        assert_eq!(smoother.smooth(&[5.0, 9.0, 3.0]), 3.0);
    }
}
