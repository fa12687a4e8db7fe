//! Trend coefficient from recent monthly totals

use super::stats::{linear_fit, mean};
use crate::config::ForecastConfig;

/// Fits a line through recent monthly totals and turns its slope into a
/// bounded multiplier (1.0 = flat)
#[derive(Debug, Clone)]
pub struct TrendEstimator {
    window: usize,
    min_points: usize,
    min_coefficient: f64,
    max_coefficient: f64,
}

impl Default for TrendEstimator {
    fn default() -> Self {
        Self::new(&ForecastConfig::default())
    }
}

impl TrendEstimator {
    pub fn new(config: &ForecastConfig) -> Self {
        Self {
            window: config.trend_window_months,
            min_points: config.trend_min_points,
            min_coefficient: config.trend_min_coefficient,
            max_coefficient: config.trend_max_coefficient,
        }
    }

    /// `totals` is ordered most recent first; only the first `window` are used
    pub fn coefficient(&self, totals: &[f64]) -> f64 {
        let mut usable: Vec<f64> = totals
            .iter()
            .take(self.window)
            .copied()
            .filter(|t| t.is_finite() && *t > 0.0)
            .collect();

        if usable.len() < self.min_points {
            return 1.0;
        }
        usable.reverse();

        let xs: Vec<f64> = (1..=usable.len()).map(|x| x as f64).collect();
        let Some((slope, _)) = linear_fit(&xs, &usable) else {
            return 1.0;
        };

        let avg = mean(&usable);
        if avg <= 0.0 {
            return 1.0;
        }

        (1.0 + slope / avg).clamp(self.min_coefficient, self.max_coefficient)
    }
}
