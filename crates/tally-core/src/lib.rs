//! Tally Core Library
//!
//! Predictive expense analytics over aggregated spending history:
//! - Ensemble forecasting of monthly totals with confidence bands
//! - Z-score anomaly detection on daily spending
//! - Descriptive statistics and cross-category correlation
//! - Multi-month projection, seasonal profile and weekday heatmap
//! - Time series sources, including recurring-expense enrichment
//! - Layered TOML configuration for every tuning constant

pub mod analytics;
pub mod calendar;
pub mod config;
pub mod error;
pub mod models;
pub mod recurring;
pub mod source;

/// Ledger fixture builders for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analytics::{
    AnomalyReport, CorrelationReport, DescriptiveStats, ForecastMethod, Heatmap,
    PredictionResult, PredictiveEngine, ProjectionReport, SeasonalMonth,
};
pub use calendar::YearMonth;
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use models::{
    CategoryMonthlyTotal, DailyAggregate, ExpenseTransaction, Frequency, HistoricalDataPoint,
    Ledger, MonthlyAggregate, PeriodType, RecurringExpense,
};
pub use recurring::{EnrichedSource, RecurringExpansionCache};
pub use source::{MemorySource, TimeSeriesSource};
