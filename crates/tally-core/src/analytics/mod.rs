//! Predictive Analytics - Forecasts and Statistics over Spending History
//!
//! The analytics engine works on already-aggregated time series supplied by a
//! [`TimeSeriesSource`](crate::source::TimeSeriesSource). It never touches raw
//! storage, and no component keeps state between calls.
//!
//! ## Components
//!
//! - **Ensemble Forecaster** - Combines pace, historical trend, weekday-aware,
//!   exponential smoothing and auto-regressive estimates into one prediction
//! - **Anomaly Detector** - Flags days whose spending deviates by z-score
//! - **Descriptive Statistics** - Quartiles, skewness, CV and confidence interval
//! - **Correlation Analyzer** - Pearson correlation among top categories
//! - **Monthly Projector** - Multi-month linear + moving-average projection
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_core::analytics::PredictiveEngine;
//! use tally_core::source::MemorySource;
//!
//! let source = MemorySource::from_ledger(&ledger);
//! let engine = PredictiveEngine::new(&source);
//! let forecast = engine.forecast(account_id, 2026, 8, 3)?;
//! ```

pub mod anomaly;
pub mod autoregressive;
pub mod confidence;
pub mod correlation;
pub mod descriptive;
pub mod engine;
pub mod ensemble;
pub mod outlier;
pub mod projection;
pub mod seasonality;
pub mod smoothing;
pub mod stats;
pub mod trend;
pub mod types;

pub use anomaly::AnomalyDetector;
pub use autoregressive::AutoRegressiveEstimator;
pub use confidence::{ConfidenceBand, ConfidenceEstimator};
pub use correlation::CorrelationAnalyzer;
pub use descriptive::DescriptiveStatsEngine;
pub use engine::PredictiveEngine;
pub use ensemble::{EnsembleForecast, EnsembleInputs, EnsemblePredictor, MonthProgress};
pub use outlier::OutlierFilter;
pub use projection::MonthlyProjector;
pub use seasonality::WeekdayPattern;
pub use smoothing::SmoothingEstimator;
pub use trend::TrendEstimator;
pub use types::{
    AnomalyRecord, AnomalyReport, AnomalySeverity, AnomalyStatistics, AnomalyType,
    ConfidenceInterval, CorrelationDirection, CorrelationPair, CorrelationReport,
    CorrelationStrength, DescriptiveStats, ForecastMethod, Heatmap, HeatmapCell,
    MonthlyProjection, PredictionResult, ProjectionModel, ProjectionReport, Quartiles,
    SeasonalMonth, SkewInterpretation, TrendDirection,
};
