//! Descriptive statistics over a series of period totals

use super::stats::{floor_quantile, mean, population_variance, sorted};
use super::types::{ConfidenceInterval, DescriptiveStats, Quartiles, SkewInterpretation};
use crate::config::StatisticsConfig;
use crate::error::{Error, Result};
use crate::models::PeriodType;

const SYMMETRIC_SKEW: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct DescriptiveStatsEngine {
    min_points: usize,
    z_score: f64,
}

impl Default for DescriptiveStatsEngine {
    fn default() -> Self {
        Self::new(&StatisticsConfig::default())
    }
}

impl DescriptiveStatsEngine {
    pub fn new(config: &StatisticsConfig) -> Self {
        Self {
            min_points: config.min_points,
            z_score: config.z_score,
        }
    }

    pub fn describe(&self, period_type: PeriodType, values: &[f64]) -> Result<DescriptiveStats> {
        if values.len() < self.min_points {
            return Err(Error::InsufficientData(format!(
                "{} statistics need at least {} periods, found {}",
                period_type,
                self.min_points,
                values.len()
            )));
        }

        let n = values.len() as f64;
        let sorted = sorted(values);
        let avg = mean(values);
        let variance = population_variance(values);
        let std_deviation = variance.sqrt();

        let q1 = floor_quantile(&sorted, 0.25);
        let q2 = floor_quantile(&sorted, 0.5);
        let q3 = floor_quantile(&sorted, 0.75);

        let min = sorted[0];
        let max = sorted[sorted.len() - 1];

        let coefficient_of_variation = if avg > 0.0 {
            std_deviation / avg * 100.0
        } else {
            0.0
        };

        let skewness = if std_deviation > 0.0 {
            values
                .iter()
                .map(|v| ((v - avg) / std_deviation).powi(3))
                .sum::<f64>()
                / n
        } else {
            0.0
        };

        let margin_of_error = self.z_score * std_deviation / n.sqrt();

        Ok(DescriptiveStats {
            period_type,
            sample_size: values.len(),
            mean: avg,
            median: q2,
            min,
            max,
            range: max - min,
            variance,
            std_deviation,
            coefficient_of_variation,
            quartiles: Quartiles { q1, q2, q3 },
            iqr: q3 - q1,
            skewness,
            skew_interpretation: interpret_skew(skewness),
            confidence_interval_95: ConfidenceInterval {
                lower: avg - margin_of_error,
                upper: avg + margin_of_error,
                margin_of_error,
            },
        })
    }
}

fn interpret_skew(skewness: f64) -> SkewInterpretation {
    if skewness.abs() < SYMMETRIC_SKEW {
        SkewInterpretation::Symmetric
    } else if skewness > 0.0 {
        SkewInterpretation::RightSkewed
    } else {
        SkewInterpretation::LeftSkewed
    }
}
