//! Confidence interval around a forecast

use super::stats::{mean, population_std};
use crate::config::ConfidenceConfig;
use crate::models::HistoricalDataPoint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceBand {
    pub lower: f64,
    pub upper: f64,
    pub margin: f64,
}

#[derive(Debug, Clone)]
pub struct ConfidenceEstimator {
    z_score: f64,
    fallback_margin: f64,
    min_points: usize,
}

impl Default for ConfidenceEstimator {
    fn default() -> Self {
        Self::new(&ConfidenceConfig::default())
    }
}

impl ConfidenceEstimator {
    pub fn new(config: &ConfidenceConfig) -> Self {
        Self {
            z_score: config.z_score,
            fallback_margin: config.fallback_margin,
            min_points: config.min_points,
        }
    }

    /// Interval from the spread of past totals of the same month.
    ///
    /// With enough history the band is `historical mean +/- z * std` and does not
    /// move with `predicted`. Otherwise it is a fixed fraction around `predicted`.
    /// The lower bound never goes below zero.
    pub fn interval(&self, historical: &[HistoricalDataPoint], predicted: f64) -> ConfidenceBand {
        let (center, margin) = if historical.len() < self.min_points {
            (predicted, predicted.abs() * self.fallback_margin)
        } else {
            let totals: Vec<f64> = historical.iter().map(|p| p.total).collect();
            (mean(&totals), self.z_score * population_std(&totals))
        };

        ConfidenceBand {
            lower: (center - margin).max(0.0),
            upper: center + margin,
            margin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(totals: &[f64]) -> Vec<HistoricalDataPoint> {
        totals
            .iter()
            .map(|total| HistoricalDataPoint {
                year: 2025,
                month: 8,
                total: *total,
                days_in_month: 31,
            })
            .collect()
    }

    #[test]
    fn test_fallback_margin_with_thin_history() {
        let estimator = ConfidenceEstimator::default();
        let band = estimator.interval(&history(&[900.0]), 1000.0);
        assert!((band.margin - 100.0).abs() < 1e-9);
        assert!((band.lower - 900.0).abs() < 1e-9);
        assert!((band.upper - 1100.0).abs() < 1e-9);
    }

    #[test]
    fn test_interval_centered_on_history() {
        let estimator = ConfidenceEstimator::default();
        let band = estimator.interval(&history(&[1000.0, 1100.0, 1200.0]), 1240.0);

        let std = (20_000.0_f64 / 3.0).sqrt();
        assert!((band.margin - 1.96 * std).abs() < 1e-9);
        assert!((band.lower - (1100.0 - 1.96 * std)).abs() < 1e-9);
        assert!((band.upper - (1100.0 + 1.96 * std)).abs() < 1e-9);

        // The band ignores the prediction
        let far = estimator.interval(&history(&[1000.0, 1100.0, 1200.0]), 5000.0);
        assert_eq!(far, band);
        assert!(far.upper < 5000.0);
    }

    #[test]
    fn test_margin_grows_with_spread() {
        let estimator = ConfidenceEstimator::default();
        let narrow = estimator.interval(&history(&[990.0, 1010.0]), 1000.0);
        let wide = estimator.interval(&history(&[900.0, 1100.0]), 1000.0);
        let wider = estimator.interval(&history(&[500.0, 1500.0]), 1000.0);
        assert!(narrow.margin <= wide.margin);
        assert!(wide.margin <= wider.margin);
    }

    #[test]
    fn test_lower_bound_floored() {
        let estimator = ConfidenceEstimator::default();
        let band = estimator.interval(&history(&[0.0, 1000.0]), 500.0);
        assert_eq!(band.lower, 0.0);
    }
}
