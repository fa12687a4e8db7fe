//! Integration tests for tally-core
//!
//! These tests drive the full ledger → source → engine workflow.

use chrono::{Duration, NaiveDate};
use tally_core::{
    analytics::{AnomalySeverity, AnomalyType, CorrelationDirection, CorrelationStrength},
    config::{EngineConfig, MethodWeights},
    models::{
        CategoryMonthlyTotal, DailyAggregate, ExpenseTransaction, Frequency, MonthlyAggregate,
        PeriodType, RecurringExpense,
    },
    EnrichedSource, Error, ForecastMethod, MemorySource, PredictiveEngine,
    RecurringExpansionCache, TimeSeriesSource, YearMonth,
};

const ACCOUNT: i64 = 1;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tx(date: NaiveDate, amount: f64, category: &str) -> ExpenseTransaction {
    ExpenseTransaction {
        account_id: ACCOUNT,
        date,
        amount,
        category: Some(category.to_string()),
        shop: None,
    }
}

/// One transaction per month on `day`, starting at `start`
fn monthly(start: YearMonth, day: u32, totals: &[f64], category: &str) -> Vec<ExpenseTransaction> {
    totals
        .iter()
        .enumerate()
        .map(|(i, total)| {
            let month = start.shift(i as i32);
            tx(date(month.year, month.month, day), *total, category)
        })
        .collect()
}

fn daily(start: NaiveDate, amounts: &[f64]) -> Vec<ExpenseTransaction> {
    amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| tx(start + Duration::days(i as i64), *amount, "Daily"))
        .collect()
}

/// Three years of history with Augusts at 1000, 1100, 1200 and every other
/// month at 1050, plus the first half of August 2026 at 600 with heavier
/// weekend spending.
fn august_ledger() -> Vec<ExpenseTransaction> {
    let mut totals = vec![1050.0; 36];
    totals[0] = 1000.0; // 2023-08
    totals[12] = 1100.0; // 2024-08
    totals[24] = 1200.0; // 2025-08

    let mut transactions = monthly(YearMonth::new(2023, 8).unwrap(), 4, &totals, "Household");
    // 2026-08-01 is a Saturday
    transactions.extend(daily(
        date(2026, 8, 1),
        &[
            80.0, 80.0, 20.0, 20.0, 20.0, 20.0, 20.0, 80.0, 80.0, 20.0, 20.0, 20.0, 20.0, 20.0,
            80.0,
        ],
    ));
    transactions
}

fn mid_august() -> NaiveDate {
    date(2026, 8, 15)
}

// =============================================================================
// Forecast Tests
// =============================================================================

#[test]
fn test_forecast_in_progress_month() {
    let source = MemorySource::new(august_ledger());
    let engine = PredictiveEngine::new(&source).with_reference_date(mid_august());

    let results = engine.forecast(ACCOUNT, 2026, 8, 1).unwrap();
    assert_eq!(results.len(), 1);
    let august = &results[0];

    assert_eq!((august.year, august.month), (2026, 8));
    assert_eq!(august.current_actual, 600.0);
    assert_eq!(august.current_day, 15);
    assert_eq!(august.days_in_month, 31);
    assert_eq!(august.historical_points_used, 3);
    assert_eq!(august.last_year_actual, Some(1200.0));

    // 600 + 40 * 16
    assert_eq!(august.method_predictions[&ForecastMethod::SimplePace], 1240.0);
    assert_eq!(august.methods_used.len(), 5);

    let values: Vec<f64> = august.method_predictions.values().copied().collect();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    assert!(august.predicted_amount > min && august.predicted_amount < max);

    // Band is centered on the historical mean, not the prediction
    let margin = 1.96 * (20_000.0_f64 / 3.0).sqrt();
    assert!((august.confidence_margin - margin).abs() < 1e-6);
    assert!((august.confidence_lower - (1100.0 - margin)).abs() < 1e-6);
    assert!((august.confidence_upper - (1100.0 + margin)).abs() < 1e-6);
    // The weekday-aware estimate carries the heavy weekends forward, so the
    // blend (about 1884.67) lands above a band built from past Augusts alone
    assert!(!august.within_confidence());
    assert!(august.predicted_amount > august.confidence_upper);
    assert!((august.predicted_amount - 1884.674).abs() < 0.01);

    assert!(august.trend_coefficient >= 0.8 && august.trend_coefficient <= 1.2);
    assert!(august.seasonal_factor > 0.0);
}

#[test]
fn test_forecast_future_months_have_no_pace() {
    let source = MemorySource::new(august_ledger());
    let engine = PredictiveEngine::new(&source).with_reference_date(mid_august());

    let results = engine.forecast(ACCOUNT, 2026, 8, 3).unwrap();
    assert_eq!(results.len(), 3);

    for future in &results[1..] {
        assert_eq!(future.current_day, 0);
        assert_eq!(future.current_actual, 0.0);
        assert!(!future.methods_used.contains(&ForecastMethod::SimplePace));
        assert!(future.methods_used.contains(&ForecastMethod::HistoricalTrend));
        assert!(future.methods_used.contains(&ForecastMethod::WeekdayAware));
        assert!(future.predicted_amount > 0.0);
    }
    assert_eq!((results[2].year, results[2].month), (2026, 10));
}

#[test]
fn test_forecast_completed_month() {
    let source = MemorySource::new(august_ledger());
    let engine = PredictiveEngine::new(&source).with_reference_date(mid_august());

    let july = &engine.forecast(ACCOUNT, 2026, 7, 1).unwrap()[0];
    assert_eq!(july.current_day, 31);
    assert_eq!(july.current_actual, 1050.0);
    // Month is over, so pace adds nothing
    assert_eq!(july.method_predictions[&ForecastMethod::SimplePace], 1050.0);
}

#[test]
fn test_forecast_months_ahead_clamped() {
    let source = MemorySource::new(august_ledger());
    let engine = PredictiveEngine::new(&source).with_reference_date(mid_august());

    assert_eq!(engine.forecast(ACCOUNT, 2026, 8, 0).unwrap().len(), 1);
    assert_eq!(engine.forecast(ACCOUNT, 2026, 8, 99).unwrap().len(), 12);
}

#[test]
fn test_forecast_insufficient_history() {
    let source = MemorySource::new(monthly(
        YearMonth::new(2026, 6).unwrap(),
        1,
        &[100.0, 200.0],
        "Household",
    ));
    let engine = PredictiveEngine::new(&source).with_reference_date(mid_august());

    assert!(engine
        .forecast(ACCOUNT, 2026, 8, 1)
        .unwrap_err()
        .is_insufficient_data());
}

#[test]
fn test_pace_only_weights() {
    let source = MemorySource::new(august_ledger());
    let mut config = EngineConfig::default();
    config.forecast.weights = MethodWeights {
        simple_pace: 1.0,
        historical_trend: 0.0,
        weekday_aware: 0.0,
        exponential_smoothing: 0.0,
        arima: 0.0,
    };
    config.validate().unwrap();

    let engine = PredictiveEngine::with_config(&source, config).with_reference_date(mid_august());
    let august = &engine.forecast(ACCOUNT, 2026, 8, 1).unwrap()[0];
    assert!((august.predicted_amount - 1240.0).abs() < 1e-9);
}

#[test]
fn test_forecast_serializes_method_names() {
    let source = MemorySource::new(august_ledger());
    let engine = PredictiveEngine::new(&source).with_reference_date(mid_august());
    let results = engine.forecast(ACCOUNT, 2026, 8, 1).unwrap();

    let json = serde_json::to_value(&results[0]).unwrap();
    assert_eq!(json["method_predictions"]["simple_pace"], 1240.0);
    assert!(json["methods_used"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("exponential_smoothing")));
}

// =============================================================================
// Anomaly Tests
// =============================================================================

#[test]
fn test_anomaly_single_spike() {
    let source = MemorySource::new(daily(
        date(2026, 8, 9),
        &[100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 1000.0],
    ));
    let engine = PredictiveEngine::new(&source).with_reference_date(mid_august());

    let report = engine.detect_anomalies(ACCOUNT, 90, 2.0).unwrap();
    assert_eq!(report.anomalies.len(), 1);

    let spike = &report.anomalies[0];
    assert_eq!(spike.date, mid_august());
    assert_eq!(spike.anomaly_type, AnomalyType::High);
    assert_eq!(spike.severity, AnomalySeverity::Moderate);
    assert!((spike.z_score - 2.449).abs() < 0.01);
    assert_eq!(report.statistics.total_days, 7);
    assert_eq!(report.statistics.anomaly_count, 1);
}

#[test]
fn test_anomaly_needs_a_week_of_data() {
    let source = MemorySource::new(daily(date(2026, 8, 10), &[10.0; 6]));
    let engine = PredictiveEngine::new(&source).with_reference_date(mid_august());

    assert!(engine
        .detect_anomalies(ACCOUNT, 90, 2.0)
        .unwrap_err()
        .is_insufficient_data());
}

#[test]
fn test_anomaly_lookback_window() {
    let mut transactions = daily(date(2026, 8, 1), &[10.0; 15]);
    // Far outside a 30 day lookback
    transactions.push(tx(date(2026, 1, 3), 5000.0, "Travel"));
    let source = MemorySource::new(transactions);
    let engine = PredictiveEngine::new(&source).with_reference_date(mid_august());

    let report = engine.detect_anomalies(ACCOUNT, 30, 2.0).unwrap();
    assert_eq!(report.statistics.total_days, 15);
    assert!(report.anomalies.is_empty());
}

#[test]
fn test_anomaly_huge_lookback_is_clamped() {
    let mut transactions = daily(date(2026, 8, 1), &[10.0; 15]);
    transactions.push(tx(date(2018, 3, 2), 5000.0, "Travel"));
    // Beyond the longest allowed lookback
    transactions.push(tx(date(2000, 1, 1), 5000.0, "Travel"));
    let source = MemorySource::new(transactions);
    let engine = PredictiveEngine::new(&source).with_reference_date(mid_august());

    let report = engine.detect_anomalies(ACCOUNT, u32::MAX, 2.0).unwrap();
    assert_eq!(report.statistics.total_days, 16);
    assert_eq!(report.anomalies.len(), 1);
    // One spike among 15 equal days sits sqrt(15) deviations out
    assert!((report.anomalies[0].z_score - 15.0_f64.sqrt()).abs() < 1e-9);
    assert_eq!(report.anomalies[0].severity, AnomalySeverity::Critical);
}

#[test]
fn test_anomaly_non_finite_sensitivity() {
    let source = MemorySource::new(daily(
        date(2026, 8, 1),
        &[10.0, 40.0, 70.0, 40.0, 20.0, 60.0, 40.0],
    ));
    let engine = PredictiveEngine::new(&source).with_reference_date(mid_august());

    let nan = engine.detect_anomalies(ACCOUNT, 30, f64::NAN).unwrap();
    assert_eq!(nan.statistics.sensitivity, 0.0);
    assert_eq!(nan.anomalies.len(), 4);

    let negative = engine.detect_anomalies(ACCOUNT, 30, f64::NEG_INFINITY).unwrap();
    assert_eq!(negative.statistics.sensitivity, 0.0);
    assert_eq!(negative.anomalies.len(), 4);

    let infinite = engine.detect_anomalies(ACCOUNT, 30, f64::INFINITY).unwrap();
    assert!(infinite.anomalies.is_empty());
}

// =============================================================================
// Statistics and Correlation Tests
// =============================================================================

#[test]
fn test_monthly_statistics() {
    let source = MemorySource::new(monthly(
        YearMonth::new(2026, 5).unwrap(),
        10,
        &[10.0, 20.0, 30.0, 40.0],
        "Household",
    ));
    let engine = PredictiveEngine::new(&source).with_reference_date(mid_august());

    let stats = engine.compute_statistics(ACCOUNT, PeriodType::Monthly).unwrap();
    assert_eq!(stats.sample_size, 4);
    assert_eq!(stats.mean, 25.0);
    assert_eq!(stats.quartiles.q1, 20.0);
    assert_eq!(stats.quartiles.q2, 30.0);
    assert_eq!(stats.quartiles.q3, 40.0);
    assert_eq!(stats.period_type, PeriodType::Monthly);
}

#[test]
fn test_daily_statistics_window() {
    let mut transactions = daily(date(2026, 8, 1), &[10.0, 20.0, 30.0]);
    transactions.push(tx(date(2025, 1, 1), 9999.0, "Old"));
    let source = MemorySource::new(transactions);
    let engine = PredictiveEngine::new(&source).with_reference_date(mid_august());

    let stats = engine.compute_statistics(ACCOUNT, PeriodType::Daily).unwrap();
    assert_eq!(stats.sample_size, 3);
    assert_eq!(stats.max, 30.0);

    let empty = MemorySource::default();
    let engine = PredictiveEngine::new(&empty).with_reference_date(mid_august());
    assert!(engine
        .compute_statistics(ACCOUNT, PeriodType::Daily)
        .unwrap_err()
        .is_insufficient_data());
}

#[test]
fn test_category_correlation() {
    let start = YearMonth::new(2026, 6).unwrap();
    let mut transactions = monthly(start, 1, &[100.0, 200.0, 300.0], "Dining");
    transactions.extend(monthly(start, 2, &[300.0, 200.0, 100.0], "Groceries"));
    let source = MemorySource::new(transactions);
    let engine = PredictiveEngine::new(&source).with_reference_date(mid_august());

    let report = engine.correlate_categories(ACCOUNT).unwrap();
    assert_eq!(report.total_months, 3);
    assert_eq!(report.correlations.len(), 1);

    let pair = &report.correlations[0];
    assert!((pair.coefficient + 1.0).abs() < 1e-9);
    assert_eq!(pair.direction, CorrelationDirection::Negative);
    assert_eq!(pair.strength, CorrelationStrength::Strong);
}

// =============================================================================
// Projection, Heatmap and Seasonal Profile Tests
// =============================================================================

#[test]
fn test_monthly_projection() {
    let totals: Vec<f64> = (0..12).map(|i| 1000.0 + 50.0 * i as f64).collect();
    let source = MemorySource::new(monthly(
        YearMonth::new(2025, 9).unwrap(),
        10,
        &totals,
        "Household",
    ));
    let engine = PredictiveEngine::new(&source).with_reference_date(mid_august());

    let report = engine.project_monthly(ACCOUNT, 3).unwrap();
    assert_eq!(report.projections.len(), 3);
    assert_eq!(
        (report.projections[0].year, report.projections[0].month),
        (2026, 9)
    );
    assert_eq!(report.model.data_points, 12);
    assert!((report.model.slope - 50.0).abs() < 1e-9);
    assert!(report.projections[0].confidence > report.projections[2].confidence);
}

#[test]
fn test_heatmap_and_seasonal_profile() {
    let mut transactions = monthly(
        YearMonth::new(2024, 9).unwrap(),
        1,
        &[100.0; 24],
        "Household",
    );
    transactions.push(tx(date(2025, 12, 1), 500.0, "Gifts"));
    let source = MemorySource::new(transactions);
    let engine = PredictiveEngine::new(&source).with_reference_date(mid_august());

    let profile = engine.seasonal_profile(ACCOUNT).unwrap();
    let december = profile.iter().find(|m| m.month == 12).unwrap();
    assert_eq!(december.years, 2);
    assert_eq!(december.average_total, 350.0);

    let heatmap = engine.weekday_month_heatmap(ACCOUNT).unwrap();
    assert!(!heatmap.cells.is_empty());
    assert_eq!(heatmap.max_value, 600.0);
}

// =============================================================================
// Source Composition Tests
// =============================================================================

#[test]
fn test_recurring_expenses_feed_statistics() {
    let recurring = vec![RecurringExpense {
        id: 1,
        account_id: ACCOUNT,
        name: "Rent".to_string(),
        amount: 800.0,
        category: Some("Housing".to_string()),
        frequency: Frequency::Monthly,
        start_date: date(2023, 1, 1),
        end_date: None,
    }];
    let cache = RecurringExpansionCache::new();
    let source = EnrichedSource::new(MemorySource::default(), &recurring, &cache);
    let engine = PredictiveEngine::new(&source).with_reference_date(mid_august());

    let stats = engine.compute_statistics(ACCOUNT, PeriodType::Monthly).unwrap();
    assert_eq!(stats.sample_size, 24);
    assert_eq!(stats.mean, 800.0);
    assert_eq!(stats.std_deviation, 0.0);

    let forecast = engine.forecast(ACCOUNT, 2026, 9, 1).unwrap();
    assert!((forecast[0].predicted_amount - 800.0).abs() < 1e-6);
}

#[test]
fn test_engine_over_trait_object() {
    let source = MemorySource::new(august_ledger());
    let dyn_source: &dyn TimeSeriesSource = &source;
    let engine = PredictiveEngine::new(dyn_source).with_reference_date(mid_august());

    assert_eq!(engine.forecast(ACCOUNT, 2026, 8, 1).unwrap().len(), 1);
}

#[test]
fn test_accounts_are_isolated() {
    let source = MemorySource::new(august_ledger());
    let engine = PredictiveEngine::new(&source).with_reference_date(mid_august());

    assert!(engine
        .forecast(ACCOUNT + 1, 2026, 8, 1)
        .unwrap_err()
        .is_insufficient_data());
}

/// A backing store that is down
struct UnavailableSource;

impl TimeSeriesSource for UnavailableSource {
    fn monthly_totals(
        &self,
        _account_id: i64,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> tally_core::Result<Vec<MonthlyAggregate>> {
        Err(Error::Source("ledger service unavailable".to_string()))
    }

    fn daily_totals(
        &self,
        _account_id: i64,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> tally_core::Result<Vec<DailyAggregate>> {
        Err(Error::Source("ledger service unavailable".to_string()))
    }

    fn category_monthly_totals(
        &self,
        _account_id: i64,
        _months_back: u32,
        _as_of: NaiveDate,
    ) -> tally_core::Result<Vec<CategoryMonthlyTotal>> {
        Err(Error::Source("ledger service unavailable".to_string()))
    }
}

#[test]
fn test_source_failures_propagate() {
    let engine = PredictiveEngine::new(&UnavailableSource).with_reference_date(mid_august());

    let err = engine.forecast(ACCOUNT, 2026, 8, 1).unwrap_err();
    assert!(matches!(err, Error::Source(_)));
    assert!(!err.is_insufficient_data());

    assert!(matches!(
        engine.detect_anomalies(ACCOUNT, 30, 2.0),
        Err(Error::Source(_))
    ));
    assert!(matches!(
        engine.correlate_categories(ACCOUNT),
        Err(Error::Source(_))
    ));

    // Recurring enrichment does not mask inner failures
    let cache = RecurringExpansionCache::new();
    let enriched = EnrichedSource::new(UnavailableSource, &[], &cache);
    let err = enriched
        .daily_totals(ACCOUNT, date(2026, 8, 1), mid_august())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Time series source error: ledger service unavailable"
    );
}
