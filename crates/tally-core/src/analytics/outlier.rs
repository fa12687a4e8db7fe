//! IQR outlier rejection for historical data points

use tracing::debug;

use super::stats::{floor_quantile, sorted};
use crate::config::OutlierConfig;
use crate::models::HistoricalDataPoint;

#[derive(Debug, Clone)]
pub struct OutlierFilter {
    iqr_multiplier: f64,
    min_points: usize,
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self::new(&OutlierConfig::default())
    }
}

impl OutlierFilter {
    pub fn new(config: &OutlierConfig) -> Self {
        Self {
            iqr_multiplier: config.iqr_multiplier,
            min_points: config.min_points,
        }
    }

    /// Drop points outside `[Q1 - k*IQR, Q3 + k*IQR]`, keeping input order.
    ///
    /// Too few points to estimate quartiles are returned unchanged.
    pub fn filter(&self, points: &[HistoricalDataPoint]) -> Vec<HistoricalDataPoint> {
        if points.len() < self.min_points {
            return points.to_vec();
        }

        let totals: Vec<f64> = points.iter().map(|p| p.total).collect();
        let sorted = sorted(&totals);
        let q1 = floor_quantile(&sorted, 0.25);
        let q3 = floor_quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let lower = q1 - self.iqr_multiplier * iqr;
        let upper = q3 + self.iqr_multiplier * iqr;

        let kept: Vec<HistoricalDataPoint> = points
            .iter()
            .filter(|p| p.total >= lower && p.total <= upper)
            .cloned()
            .collect();

        if kept.len() < points.len() {
            debug!(
                dropped = points.len() - kept.len(),
                lower, upper, "Dropped outlier history points"
            );
        }

        kept
    }
}
