//! Predictive engine facade
//!
//! Pulls aggregates from a [`TimeSeriesSource`], runs the relevant analyzers and
//! returns typed results. The engine borrows its source and holds no mutable
//! state, so one engine can serve any number of calls.

use chrono::{Datelike, NaiveDate};

use super::anomaly::AnomalyDetector;
use super::confidence::ConfidenceEstimator;
use super::correlation::CorrelationAnalyzer;
use super::descriptive::DescriptiveStatsEngine;
use super::ensemble::{EnsembleInputs, EnsemblePredictor, MonthProgress};
use super::outlier::OutlierFilter;
use super::projection::MonthlyProjector;
use super::seasonality::{self, WeekdayPattern};
use super::trend::TrendEstimator;
use super::types::{
    AnomalyReport, CorrelationReport, DescriptiveStats, Heatmap, PredictionResult,
    ProjectionReport, SeasonalMonth,
};
use crate::calendar::{days_before, months_before, YearMonth};
use crate::config::{EngineConfig, MAX_DAYS_BACK, MAX_MONTHS_AHEAD};
use crate::error::{Error, Result};
use crate::models::{HistoricalDataPoint, MonthlyAggregate, PeriodType};
use crate::source::TimeSeriesSource;

pub struct PredictiveEngine<'a, S: TimeSeriesSource + ?Sized> {
    source: &'a S,
    config: EngineConfig,
    reference_date: Option<NaiveDate>,
}

impl<'a, S: TimeSeriesSource + ?Sized> PredictiveEngine<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self::with_config(source, EngineConfig::default())
    }

    pub fn with_config(source: &'a S, config: EngineConfig) -> Self {
        Self {
            source,
            config,
            reference_date: None,
        }
    }

    /// Pin "today" instead of reading the local clock
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Forecast total spending for `months_ahead` consecutive months starting
    /// at `year`/`month`.
    ///
    /// History is drawn from completed months before both the target month and
    /// the current month.
    pub fn forecast(
        &self,
        account_id: i64,
        year: i32,
        month: u32,
        months_ahead: u32,
    ) -> Result<Vec<PredictionResult>> {
        let target = YearMonth::new(year, month).ok_or_else(|| {
            Error::InvalidParameter(format!("month must be within 1..=12, got {}", month))
        })?;
        let months_ahead = clamp_months_ahead(months_ahead);

        let forecast_config = &self.config.forecast;
        let today = self.today();
        let current_month = YearMonth::from_date(today);

        let cutoff = target.min(current_month);
        let history_months =
            i32::try_from(forecast_config.history_years.saturating_mul(12)).unwrap_or(i32::MAX);
        let history = self.source.monthly_totals(
            account_id,
            cutoff.shift(-history_months).first_day(),
            cutoff.prev().last_day(),
        )?;

        if history.len() < forecast_config.min_history_months {
            return Err(Error::InsufficientData(format!(
                "forecast needs at least {} months of history, found {}",
                forecast_config.min_history_months,
                history.len()
            )));
        }

        let history_totals: Vec<f64> = history.iter().map(|m| m.total_amount).collect();
        let recent_first: Vec<f64> = history_totals.iter().rev().copied().collect();
        let trend_coefficient = TrendEstimator::new(forecast_config).coefficient(&recent_first);

        let recent_daily = self.source.daily_totals(
            account_id,
            months_before(today, forecast_config.weekday_lookback_months),
            today,
        )?;
        let weekday_pattern =
            WeekdayPattern::detect(&recent_daily, forecast_config.weekday_pattern_threshold);

        tracing::debug!(
            account_id,
            history_months = history.len(),
            trend_coefficient,
            weekday_pattern = weekday_pattern.has_pattern,
            "Prepared forecast inputs"
        );

        let outliers = OutlierFilter::new(&self.config.outliers);
        let ensemble = EnsemblePredictor::new(forecast_config);
        let confidence = ConfidenceEstimator::new(&self.config.confidence);

        let mut results = Vec::with_capacity(months_ahead as usize);
        for offset in 0..months_ahead {
            let month = target.shift(offset as i32);
            let progress = self.month_progress(account_id, month, today)?;
            let points = self.historical_points(account_id, month, current_month)?;
            let last_year_actual = points
                .iter()
                .find(|p| p.year == month.year - 1)
                .map(|p| p.total);

            let filtered = outliers.filter(&points);
            let outcome = ensemble.predict(&EnsembleInputs {
                month,
                progress,
                historical: &filtered,
                trend_coefficient,
                weekday_pattern: Some(&weekday_pattern),
                history_totals: &history_totals,
            });
            let band = confidence.interval(&filtered, outcome.predicted_amount);

            let result = PredictionResult {
                year: month.year,
                month: month.month,
                predicted_amount: outcome.predicted_amount,
                confidence_lower: band.lower,
                confidence_upper: band.upper,
                confidence_margin: band.margin,
                trend_coefficient,
                seasonal_factor: seasonality::monthly_factor(&history, month.month),
                methods_used: outcome.method_predictions.keys().copied().collect(),
                method_predictions: outcome.method_predictions,
                historical_points_used: filtered.len(),
                last_year_actual,
                current_actual: progress.current_actual,
                current_day: progress.current_day,
                days_in_month: progress.days_in_month,
            };

            if !result.within_confidence() {
                tracing::warn!(
                    month = %month,
                    predicted = result.predicted_amount,
                    lower = result.confidence_lower,
                    upper = result.confidence_upper,
                    "Prediction falls outside its historical confidence band"
                );
            }

            results.push(result);
        }

        tracing::info!(
            account_id,
            start = %target,
            months = results.len(),
            "Forecast complete"
        );

        Ok(results)
    }

    /// Spending so far in `month` as seen from `today`
    fn month_progress(
        &self,
        account_id: i64,
        month: YearMonth,
        today: NaiveDate,
    ) -> Result<MonthProgress> {
        let days_in_month = month.days_in_month();
        let current_month = YearMonth::from_date(today);

        if month > current_month {
            return Ok(MonthProgress::not_started(days_in_month));
        }

        let (through, current_day) = if month == current_month {
            (today, today.day())
        } else {
            (month.last_day(), days_in_month)
        };

        let current_actual = self
            .source
            .daily_totals(account_id, month.first_day(), through)?
            .iter()
            .map(|d| d.total_amount)
            .sum();

        Ok(MonthProgress {
            current_actual,
            current_day,
            days_in_month,
        })
    }

    /// Completed occurrences of the same calendar month in previous years,
    /// most recent first
    fn historical_points(
        &self,
        account_id: i64,
        month: YearMonth,
        current_month: YearMonth,
    ) -> Result<Vec<HistoricalDataPoint>> {
        let mut points = Vec::new();

        for years_back in 1..=self.config.forecast.history_years {
            let past = month.shift((years_back as i32).saturating_mul(-12));
            if past >= current_month {
                continue;
            }

            let totals = self
                .source
                .monthly_totals(account_id, past.first_day(), past.last_day())?;
            if let Some(aggregate) = totals.iter().find(|m| m.year_month() == past) {
                points.push(HistoricalDataPoint {
                    year: past.year,
                    month: past.month,
                    total: aggregate.total_amount,
                    days_in_month: past.days_in_month(),
                });
            }
        }

        Ok(points)
    }

    /// Scan the last `days_back` days for unusually high or low spending days
    pub fn detect_anomalies(
        &self,
        account_id: i64,
        days_back: u32,
        sensitivity: f64,
    ) -> Result<AnomalyReport> {
        let days_back = clamp_days_back(days_back);

        let today = self.today();
        let daily = self
            .source
            .daily_totals(account_id, days_before(today, days_back), today)?;

        let report = AnomalyDetector::new(&self.config.anomaly).detect(&daily, sensitivity)?;

        tracing::info!(
            account_id,
            days = report.statistics.total_days,
            anomalies = report.statistics.anomaly_count,
            "Anomaly scan complete"
        );

        Ok(report)
    }

    /// Descriptive statistics over recent monthly or daily totals
    pub fn compute_statistics(
        &self,
        account_id: i64,
        period_type: PeriodType,
    ) -> Result<DescriptiveStats> {
        let stats_config = &self.config.statistics;
        let today = self.today();

        let values: Vec<f64> = match period_type {
            PeriodType::Monthly => self
                .source
                .monthly_totals(
                    account_id,
                    months_before(today, stats_config.monthly_lookback_months),
                    today,
                )?
                .iter()
                .map(|m| m.total_amount)
                .collect(),
            PeriodType::Daily => self
                .source
                .daily_totals(
                    account_id,
                    days_before(today, stats_config.daily_lookback_days),
                    today,
                )?
                .iter()
                .map(|d| d.total_amount)
                .collect(),
        };

        DescriptiveStatsEngine::new(stats_config).describe(period_type, &values)
    }

    /// Pairwise correlation of the top spending categories over the trailing window
    pub fn correlate_categories(&self, account_id: i64) -> Result<CorrelationReport> {
        let correlation_config = &self.config.correlation;
        let totals = self.source.category_monthly_totals(
            account_id,
            correlation_config.months_back,
            self.today(),
        )?;

        Ok(CorrelationAnalyzer::new(correlation_config).analyze(&totals))
    }

    /// Project spending for the months after the current one
    pub fn project_monthly(&self, account_id: i64, months_ahead: u32) -> Result<ProjectionReport> {
        let months_ahead = clamp_months_ahead(months_ahead);
        let current_month = YearMonth::from_date(self.today());
        let monthly = self.recent_monthly(account_id)?;

        MonthlyProjector::new(&self.config.statistics).project(
            &monthly,
            current_month.next(),
            months_ahead,
        )
    }

    /// Average daily spend by weekday and calendar month
    pub fn weekday_month_heatmap(&self, account_id: i64) -> Result<Heatmap> {
        let today = self.today();
        let daily = self.source.daily_totals(
            account_id,
            months_before(today, self.config.statistics.heatmap_lookback_months),
            today,
        )?;

        Ok(seasonality::weekday_month_heatmap(&daily))
    }

    /// Typical total for each calendar month with data
    pub fn seasonal_profile(&self, account_id: i64) -> Result<Vec<SeasonalMonth>> {
        let monthly = self.recent_monthly(account_id)?;
        Ok(seasonality::seasonal_profile(&monthly))
    }

    /// Monthly totals for the lookback window, current month included
    fn recent_monthly(&self, account_id: i64) -> Result<Vec<MonthlyAggregate>> {
        let today = self.today();
        let lookback =
            i32::try_from(self.config.statistics.projection_lookback_months).unwrap_or(i32::MAX);
        let first = YearMonth::from_date(today).shift(1 - lookback);

        self.source
            .monthly_totals(account_id, first.first_day(), today)
    }
}

fn clamp_months_ahead(months_ahead: u32) -> u32 {
    let clamped = months_ahead.clamp(1, MAX_MONTHS_AHEAD);
    if clamped != months_ahead {
        tracing::warn!(
            requested = months_ahead,
            clamped,
            "months_ahead out of range"
        );
    }
    clamped
}

fn clamp_days_back(days_back: u32) -> u32 {
    let clamped = days_back.clamp(1, MAX_DAYS_BACK);
    if clamped != days_back {
        tracing::warn!(requested = days_back, clamped, "days_back out of range");
    }
    clamped
}
