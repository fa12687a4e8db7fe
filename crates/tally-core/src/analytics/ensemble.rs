//! Ensemble of forecasting methods
//!
//! Each method produces an estimate of the month's total when its inputs are
//! available. The ensemble averages the available estimates with the configured
//! weights, renormalized over the methods that actually ran.

use std::collections::BTreeMap;

use tracing::debug;

use super::autoregressive::AutoRegressiveEstimator;
use super::seasonality::WeekdayPattern;
use super::smoothing::SmoothingEstimator;
use super::types::ForecastMethod;
use crate::calendar::YearMonth;
use crate::config::{ForecastConfig, MethodWeights};
use crate::models::HistoricalDataPoint;

/// How far the target month has progressed on the reference date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthProgress {
    pub current_actual: f64,
    /// Days elapsed (0 when the month has not started)
    pub current_day: u32,
    pub days_in_month: u32,
}

impl MonthProgress {
    pub fn not_started(days_in_month: u32) -> Self {
        Self {
            current_actual: 0.0,
            current_day: 0,
            days_in_month,
        }
    }

    pub fn has_started(&self) -> bool {
        self.current_day > 0
    }

    /// Average spend per elapsed day
    pub fn pace(&self) -> Option<f64> {
        self.has_started()
            .then(|| self.current_actual / self.current_day as f64)
    }

    pub fn remaining_days(&self) -> u32 {
        self.days_in_month.saturating_sub(self.current_day)
    }

    /// Month-to-date spend extended at the current pace
    pub fn pace_projection(&self) -> Option<f64> {
        self.pace()
            .map(|pace| self.current_actual + pace * self.remaining_days() as f64)
    }
}

/// Everything the methods need for one target month
#[derive(Debug, Clone)]
pub struct EnsembleInputs<'a> {
    pub month: YearMonth,
    pub progress: MonthProgress,
    /// Past occurrences of the month after outlier filtering, most recent first
    pub historical: &'a [HistoricalDataPoint],
    pub trend_coefficient: f64,
    /// Present only when a weekday/weekend pattern was detected
    pub weekday_pattern: Option<&'a WeekdayPattern>,
    /// Completed monthly totals, oldest first
    pub history_totals: &'a [f64],
}

/// Outcome of combining the method estimates
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleForecast {
    pub predicted_amount: f64,
    pub method_predictions: BTreeMap<ForecastMethod, f64>,
}

#[derive(Debug, Clone)]
pub struct EnsemblePredictor {
    weights: MethodWeights,
    smoothing: SmoothingEstimator,
    autoregressive: AutoRegressiveEstimator,
    weekday_typed_share: f64,
    smoothing_history_share: f64,
    arima_history_share: f64,
}

impl Default for EnsemblePredictor {
    fn default() -> Self {
        Self::new(&ForecastConfig::default())
    }
}

impl EnsemblePredictor {
    pub fn new(config: &ForecastConfig) -> Self {
        Self {
            weights: config.weights.clone(),
            smoothing: SmoothingEstimator::new(config.smoothing_alpha),
            autoregressive: AutoRegressiveEstimator::new(config.ar_order),
            weekday_typed_share: config.weekday_typed_share,
            smoothing_history_share: config.smoothing_history_share,
            arima_history_share: config.arima_history_share,
        }
    }

    pub fn weight(&self, method: ForecastMethod) -> f64 {
        match method {
            ForecastMethod::SimplePace => self.weights.simple_pace,
            ForecastMethod::HistoricalTrend => self.weights.historical_trend,
            ForecastMethod::WeekdayAware => self.weights.weekday_aware,
            ForecastMethod::ExponentialSmoothing => self.weights.exponential_smoothing,
            ForecastMethod::Arima => self.weights.arima,
        }
    }

    /// Run every method whose inputs are available and combine them
    pub fn predict(&self, inputs: &EnsembleInputs<'_>) -> EnsembleForecast {
        let mut method_predictions = BTreeMap::new();
        for method in ForecastMethod::ALL {
            if let Some(value) = self.estimate(method, inputs) {
                method_predictions.insert(method, value);
            }
        }

        let predicted_amount = self.combine(&method_predictions, &inputs.progress);

        debug!(
            month = %inputs.month,
            methods = method_predictions.len(),
            predicted = predicted_amount,
            "Combined ensemble forecast"
        );

        EnsembleForecast {
            predicted_amount,
            method_predictions,
        }
    }

    /// Single method estimate, None when the method cannot run
    pub fn estimate(&self, method: ForecastMethod, inputs: &EnsembleInputs<'_>) -> Option<f64> {
        let progress = &inputs.progress;

        match method {
            ForecastMethod::SimplePace => progress.pace_projection(),
            ForecastMethod::HistoricalTrend => {
                weighted_historical_average(inputs.historical)
                    .map(|avg| avg * inputs.trend_coefficient)
            }
            ForecastMethod::WeekdayAware => {
                let pattern = inputs.weekday_pattern.filter(|p| p.has_pattern)?;
                let remaining = inputs.month.days_from(progress.current_day + 1);
                let typed_remaining = pattern.projected_spend(remaining);

                match progress.pace() {
                    Some(pace) => {
                        let paced_remaining = pace * progress.remaining_days() as f64;
                        Some(
                            progress.current_actual
                                + self.weekday_typed_share * typed_remaining
                                + (1.0 - self.weekday_typed_share) * paced_remaining,
                        )
                    }
                    None => Some(typed_remaining),
                }
            }
            ForecastMethod::ExponentialSmoothing => {
                if inputs.history_totals.is_empty() {
                    return None;
                }
                let smoothed = self.smoothing.smooth(inputs.history_totals);
                Some(blend(
                    smoothed,
                    progress.pace_projection(),
                    self.smoothing_history_share,
                ))
            }
            ForecastMethod::Arima => {
                if inputs.history_totals.is_empty() {
                    return None;
                }
                let ar = self.autoregressive.estimate(inputs.history_totals);
                Some(blend(ar, progress.pace_projection(), self.arima_history_share))
            }
        }
    }

    /// Weighted mean over the methods that ran
    ///
    /// With no method available: the pace projection if the month has started,
    /// otherwise the month-to-date actual.
    pub fn combine(
        &self,
        predictions: &BTreeMap<ForecastMethod, f64>,
        progress: &MonthProgress,
    ) -> f64 {
        let (weighted, total_weight) = predictions.iter().fold(
            (0.0, 0.0),
            |(sum, weights), (method, value)| {
                let weight = self.weight(*method);
                (sum + value * weight, weights + weight)
            },
        );

        if total_weight > 0.0 {
            return weighted / total_weight;
        }

        progress
            .pace_projection()
            .unwrap_or(progress.current_actual)
    }
}

/// `share * history + (1 - share) * pace` when the month has started
fn blend(history_estimate: f64, pace_projection: Option<f64>, share: f64) -> f64 {
    match pace_projection {
        Some(pace) => share * history_estimate + (1.0 - share) * pace,
        None => history_estimate,
    }
}

/// Average of `points` (most recent first) weighted n, n-1, ..., 1
pub fn weighted_historical_average(points: &[HistoricalDataPoint]) -> Option<f64> {
    if points.is_empty() {
        return None;
    }

    let n = points.len();
    let (weighted, weight_sum) =
        points
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(sum, weights), (i, point)| {
                let weight = (n - i) as f64;
                (sum + point.total * weight, weights + weight)
            });

    Some(weighted / weight_sum)
}
