//! Multi-month spending projection
//!
//! Blends a linear fit through recent monthly totals with their short moving
//! average, then scales each month by its seasonal factor. Confidence decays
//! geometrically with distance from today.

use super::seasonality::monthly_factor;
use super::stats::{linear_fit, mean};
use super::types::{MonthlyProjection, ProjectionModel, ProjectionReport, TrendDirection};
use crate::calendar::YearMonth;
use crate::config::StatisticsConfig;
use crate::error::{Error, Result};
use crate::models::MonthlyAggregate;

const MIN_POINTS: usize = 3;
const MAX_CONFIDENCE: f64 = 0.95;
const BASE_CONFIDENCE: f64 = 0.5;
/// Each month of history adds 1/48 to the base confidence
const CONFIDENCE_PER_POINT: f64 = 1.0 / 48.0;
const CONFIDENCE_DECAY: f64 = 0.9;

#[derive(Debug, Clone)]
pub struct MonthlyProjector {
    moving_average_window: usize,
    linear_share: f64,
}

impl Default for MonthlyProjector {
    fn default() -> Self {
        Self::new(&StatisticsConfig::default())
    }
}

impl MonthlyProjector {
    pub fn new(config: &StatisticsConfig) -> Self {
        Self {
            moving_average_window: config.projection_moving_average_window.max(1),
            linear_share: config.projection_linear_share,
        }
    }

    /// Project `months_ahead` months starting with `first_month`.
    ///
    /// `monthly` is the history, oldest first.
    pub fn project(
        &self,
        monthly: &[MonthlyAggregate],
        first_month: YearMonth,
        months_ahead: u32,
    ) -> Result<ProjectionReport> {
        if monthly.len() < MIN_POINTS {
            return Err(Error::InsufficientData(format!(
                "projection needs at least {} months of spending, found {}",
                MIN_POINTS,
                monthly.len()
            )));
        }

        let totals: Vec<f64> = monthly.iter().map(|m| m.total_amount).collect();
        let n = totals.len();
        let xs: Vec<f64> = (0..n).map(|x| x as f64).collect();
        let avg = mean(&totals);
        let (slope, intercept) = linear_fit(&xs, &totals).unwrap_or((0.0, avg));

        let window = self.moving_average_window.min(n);
        let moving_average = mean(&totals[n - window..]);

        let base_confidence =
            (BASE_CONFIDENCE + n as f64 * CONFIDENCE_PER_POINT).min(MAX_CONFIDENCE);

        let projections = (0..months_ahead)
            .map(|i| {
                let target = first_month.shift(i as i32);
                let linear = slope * (n as f64 + i as f64) + intercept;
                let weighted =
                    self.linear_share * linear + (1.0 - self.linear_share) * moving_average;
                let seasonal_factor = monthly_factor(monthly, target.month);

                MonthlyProjection {
                    year: target.year,
                    month: target.month,
                    predicted_amount: weighted * seasonal_factor,
                    confidence: base_confidence * CONFIDENCE_DECAY.powi(i as i32),
                    seasonal_factor,
                }
            })
            .collect();

        Ok(ProjectionReport {
            projections,
            model: ProjectionModel {
                slope,
                intercept,
                moving_average,
                trend: TrendDirection::from_slope(slope),
                trend_rate: if avg > 0.0 {
                    slope.abs() / avg * 100.0
                } else {
                    0.0
                },
                data_points: n,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(start: YearMonth, totals: &[f64]) -> Vec<MonthlyAggregate> {
        totals
            .iter()
            .enumerate()
            .map(|(i, total)| {
                let ym = start.shift(i as i32);
                MonthlyAggregate {
                    year: ym.year,
                    month: ym.month,
                    total_amount: *total,
                    transaction_count: 10,
                    active_days: 10,
                }
            })
            .collect()
    }

    #[test]
    fn test_linear_growth_projection() {
        // Jan..Mar 2026: 100, 200, 300 -> slope 100, intercept 100, MA 200
        let start = YearMonth::new(2026, 1).unwrap();
        let monthly = history(start, &[100.0, 200.0, 300.0]);
        let report = MonthlyProjector::default()
            .project(&monthly, YearMonth::new(2026, 4).unwrap(), 2)
            .unwrap();

        assert!((report.model.slope - 100.0).abs() < 1e-9);
        assert!((report.model.intercept - 100.0).abs() < 1e-9);
        assert_eq!(report.model.moving_average, 200.0);
        assert_eq!(report.model.trend, TrendDirection::Increasing);
        assert!((report.model.trend_rate - 50.0).abs() < 1e-9);

        // April has no history so its seasonal factor is neutral
        let april = &report.projections[0];
        assert_eq!((april.year, april.month), (2026, 4));
        assert_eq!(april.seasonal_factor, 1.0);
        assert!((april.predicted_amount - (0.6 * 400.0 + 0.4 * 200.0)).abs() < 1e-9);
        assert!((april.confidence - (0.5 + 3.0 / 48.0)).abs() < 1e-9);

        let may = &report.projections[1];
        assert!((may.confidence - april.confidence * 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_caps() {
        let start = YearMonth::new(2024, 1).unwrap();
        let monthly = history(start, &[500.0; 24]);
        let report = MonthlyProjector::default()
            .project(&monthly, YearMonth::new(2026, 1).unwrap(), 12)
            .unwrap();

        assert_eq!(report.projections.len(), 12);
        assert_eq!(report.projections[0].confidence, 0.95);
        assert_eq!(report.model.trend, TrendDirection::Stable);
        assert!(report
            .projections
            .iter()
            .all(|p| (p.predicted_amount - 500.0).abs() < 1e-6));
    }

    #[test]
    fn test_requires_three_months() {
        let start = YearMonth::new(2026, 1).unwrap();
        let err = MonthlyProjector::default()
            .project(&history(start, &[1.0, 2.0]), start.shift(2), 3)
            .unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_seasonal_scaling() {
        // December runs at double the average
        let start = YearMonth::new(2025, 10).unwrap();
        let monthly = history(start, &[100.0, 100.0, 400.0, 100.0, 100.0, 400.0]);
        // months: Oct, Nov, Dec, Jan, Feb, Mar
        let report = MonthlyProjector::default()
            .project(&monthly, YearMonth::new(2026, 12).unwrap(), 1)
            .unwrap();
        assert!((report.projections[0].seasonal_factor - 2.0).abs() < 1e-9);
    }
}
