//! Engine configuration
//!
//! Every heuristic constant the analytics engine relies on (ensemble weights,
//! smoothing alpha, outlier multiplier, z-scores) is a named constant here and
//! feeds [`EngineConfig::default`]. Values can be tuned from a TOML file.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a three-layer resolution:
//! 1. Explicit path passed by the caller (e.g. `tally --config`)
//! 2. Override in data dir (~/.local/share/tally/config/engine.toml)
//! 3. Embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/engine.toml");

// Forecasting
pub const HISTORY_YEARS: u32 = 3;
pub const MIN_HISTORY_MONTHS: usize = 3;
pub const MAX_MONTHS_AHEAD: u32 = 12;
pub const TREND_WINDOW_MONTHS: usize = 12;
pub const TREND_MIN_POINTS: usize = 3;
pub const TREND_MIN_COEFFICIENT: f64 = 0.8;
pub const TREND_MAX_COEFFICIENT: f64 = 1.2;
pub const SMOOTHING_ALPHA: f64 = 0.3;
pub const AR_ORDER: usize = 2;
pub const WEEKDAY_LOOKBACK_MONTHS: u32 = 6;
pub const WEEKDAY_PATTERN_THRESHOLD: f64 = 0.2;
pub const WEEKDAY_TYPED_SHARE: f64 = 0.7;
pub const SMOOTHING_HISTORY_SHARE: f64 = 0.4;
pub const ARIMA_HISTORY_SHARE: f64 = 0.3;

// Ensemble weights
pub const WEIGHT_SIMPLE_PACE: f64 = 0.15;
pub const WEIGHT_HISTORICAL_TREND: f64 = 0.25;
pub const WEIGHT_WEEKDAY_AWARE: f64 = 0.25;
pub const WEIGHT_EXPONENTIAL_SMOOTHING: f64 = 0.20;
pub const WEIGHT_ARIMA: f64 = 0.15;

// Outliers and confidence
pub const OUTLIER_IQR_MULTIPLIER: f64 = 1.5;
pub const OUTLIER_MIN_POINTS: usize = 4;
pub const CONFIDENCE_Z_SCORE: f64 = 1.96;
pub const CONFIDENCE_FALLBACK_MARGIN: f64 = 0.10;
pub const CONFIDENCE_MIN_POINTS: usize = 2;

// Anomalies
pub const ANOMALY_DAYS_BACK: u32 = 90;
pub const MAX_DAYS_BACK: u32 = 3660;
pub const ANOMALY_SENSITIVITY: f64 = 2.0;
pub const ANOMALY_MIN_POINTS: usize = 7;
pub const ANOMALY_HIGH_Z: f64 = 2.5;
pub const ANOMALY_CRITICAL_Z: f64 = 3.0;

// Correlation
pub const CORRELATION_MONTHS_BACK: u32 = 12;
pub const CORRELATION_TOP_CATEGORIES: usize = 5;
pub const CORRELATION_MIN_DENOMINATOR: f64 = 1e-4;
pub const CORRELATION_STRONG: f64 = 0.7;
pub const CORRELATION_MODERATE: f64 = 0.4;

// Descriptive statistics and projections
pub const STATS_MIN_POINTS: usize = 2;
pub const STATS_MONTHLY_LOOKBACK_MONTHS: u32 = 24;
pub const STATS_DAILY_LOOKBACK_DAYS: u32 = 90;
pub const PROJECTION_LOOKBACK_MONTHS: u32 = 24;
pub const PROJECTION_MOVING_AVERAGE_WINDOW: usize = 3;
pub const PROJECTION_LINEAR_SHARE: f64 = 0.6;
pub const HEATMAP_LOOKBACK_MONTHS: u32 = 24;

/// Upper bound for every month-based lookback window
pub const MAX_LOOKBACK_MONTHS: u32 = 1200;

/// Relative weight of each forecasting method in the ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodWeights {
    pub simple_pace: f64,
    pub historical_trend: f64,
    pub weekday_aware: f64,
    pub exponential_smoothing: f64,
    pub arima: f64,
}

impl Default for MethodWeights {
    fn default() -> Self {
        Self {
            simple_pace: WEIGHT_SIMPLE_PACE,
            historical_trend: WEIGHT_HISTORICAL_TREND,
            weekday_aware: WEIGHT_WEEKDAY_AWARE,
            exponential_smoothing: WEIGHT_EXPONENTIAL_SMOOTHING,
            arima: WEIGHT_ARIMA,
        }
    }
}

impl MethodWeights {
    fn all(&self) -> [f64; 5] {
        [
            self.simple_pace,
            self.historical_trend,
            self.weekday_aware,
            self.exponential_smoothing,
            self.arima,
        ]
    }
}

/// Ensemble forecaster settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// How many past years of the target month feed the historical methods
    pub history_years: u32,
    /// Minimum completed months before a forecast is attempted
    pub min_history_months: usize,
    pub trend_window_months: usize,
    pub trend_min_points: usize,
    pub trend_min_coefficient: f64,
    pub trend_max_coefficient: f64,
    pub smoothing_alpha: f64,
    pub ar_order: usize,
    pub weekday_lookback_months: u32,
    /// Relative weekday/weekend gap needed to call it a pattern
    pub weekday_pattern_threshold: f64,
    /// Share of the weekday-typed projection in the weekday-aware method
    pub weekday_typed_share: f64,
    /// Share of the smoothed history in the exponential smoothing method
    pub smoothing_history_share: f64,
    /// Share of the AR estimate in the arima method
    pub arima_history_share: f64,
    pub weights: MethodWeights,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            history_years: HISTORY_YEARS,
            min_history_months: MIN_HISTORY_MONTHS,
            trend_window_months: TREND_WINDOW_MONTHS,
            trend_min_points: TREND_MIN_POINTS,
            trend_min_coefficient: TREND_MIN_COEFFICIENT,
            trend_max_coefficient: TREND_MAX_COEFFICIENT,
            smoothing_alpha: SMOOTHING_ALPHA,
            ar_order: AR_ORDER,
            weekday_lookback_months: WEEKDAY_LOOKBACK_MONTHS,
            weekday_pattern_threshold: WEEKDAY_PATTERN_THRESHOLD,
            weekday_typed_share: WEEKDAY_TYPED_SHARE,
            smoothing_history_share: SMOOTHING_HISTORY_SHARE,
            arima_history_share: ARIMA_HISTORY_SHARE,
            weights: MethodWeights::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    pub iqr_multiplier: f64,
    /// Below this many points the filter passes data through untouched
    pub min_points: usize,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: OUTLIER_IQR_MULTIPLIER,
            min_points: OUTLIER_MIN_POINTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub z_score: f64,
    /// Fraction of the prediction used as margin when history is too thin
    pub fallback_margin: f64,
    pub min_points: usize,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            z_score: CONFIDENCE_Z_SCORE,
            fallback_margin: CONFIDENCE_FALLBACK_MARGIN,
            min_points: CONFIDENCE_MIN_POINTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    pub default_days_back: u32,
    pub default_sensitivity: f64,
    pub min_points: usize,
    pub high_z: f64,
    pub critical_z: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            default_days_back: ANOMALY_DAYS_BACK,
            default_sensitivity: ANOMALY_SENSITIVITY,
            min_points: ANOMALY_MIN_POINTS,
            high_z: ANOMALY_HIGH_Z,
            critical_z: ANOMALY_CRITICAL_Z,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    pub months_back: u32,
    pub top_categories: usize,
    pub min_denominator: f64,
    pub strong_threshold: f64,
    pub moderate_threshold: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            months_back: CORRELATION_MONTHS_BACK,
            top_categories: CORRELATION_TOP_CATEGORIES,
            min_denominator: CORRELATION_MIN_DENOMINATOR,
            strong_threshold: CORRELATION_STRONG,
            moderate_threshold: CORRELATION_MODERATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    pub min_points: usize,
    pub monthly_lookback_months: u32,
    pub daily_lookback_days: u32,
    pub z_score: f64,
    pub projection_lookback_months: u32,
    pub projection_moving_average_window: usize,
    pub projection_linear_share: f64,
    pub heatmap_lookback_months: u32,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            min_points: STATS_MIN_POINTS,
            monthly_lookback_months: STATS_MONTHLY_LOOKBACK_MONTHS,
            daily_lookback_days: STATS_DAILY_LOOKBACK_DAYS,
            z_score: CONFIDENCE_Z_SCORE,
            projection_lookback_months: PROJECTION_LOOKBACK_MONTHS,
            projection_moving_average_window: PROJECTION_MOVING_AVERAGE_WINDOW,
            projection_linear_share: PROJECTION_LINEAR_SHARE,
            heatmap_lookback_months: HEATMAP_LOOKBACK_MONTHS,
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub forecast: ForecastConfig,
    pub outliers: OutlierConfig,
    pub confidence: ConfidenceConfig,
    pub anomaly: AnomalyConfig,
    pub correlation: CorrelationConfig,
    pub statistics: StatisticsConfig,
}

impl EngineConfig {
    /// Load configuration, trying `override_path`, then the data-dir override,
    /// then the embedded defaults
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let content = match override_path {
            Some(path) if path.exists() => read_config(path)?,
            Some(path) => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )))
            }
            None => match default_config_path() {
                Some(path) if path.exists() => read_config(&path)?,
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        Self::from_toml(&content)
    }

    /// Parse and validate a TOML document (missing keys keep their defaults)
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the algorithms cannot work with
    pub fn validate(&self) -> Result<()> {
        let forecast = &self.forecast;

        if !(forecast.smoothing_alpha > 0.0 && forecast.smoothing_alpha <= 1.0) {
            return Err(Error::InvalidParameter(format!(
                "forecast.smoothing_alpha must be in (0, 1], got {}",
                forecast.smoothing_alpha
            )));
        }
        if forecast.ar_order == 0 {
            return Err(Error::InvalidParameter(
                "forecast.ar_order must be at least 1".to_string(),
            ));
        }
        if forecast.trend_min_coefficient > forecast.trend_max_coefficient {
            return Err(Error::InvalidParameter(format!(
                "forecast trend bounds are inverted: [{}, {}]",
                forecast.trend_min_coefficient, forecast.trend_max_coefficient
            )));
        }

        let weights = forecast.weights.all();
        if weights.iter().any(|w| *w < 0.0 || !w.is_finite()) {
            return Err(Error::InvalidParameter(
                "forecast.weights must be finite and non-negative".to_string(),
            ));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(Error::InvalidParameter(
                "forecast.weights must not all be zero".to_string(),
            ));
        }

        for (name, share) in [
            ("weekday_typed_share", forecast.weekday_typed_share),
            ("smoothing_history_share", forecast.smoothing_history_share),
            ("arima_history_share", forecast.arima_history_share),
            (
                "projection_linear_share",
                self.statistics.projection_linear_share,
            ),
        ] {
            if !(0.0..=1.0).contains(&share) {
                return Err(Error::InvalidParameter(format!(
                    "{} must be within [0, 1], got {}",
                    name, share
                )));
            }
        }

        if self.outliers.iqr_multiplier < 0.0 {
            return Err(Error::InvalidParameter(
                "outliers.iqr_multiplier must be non-negative".to_string(),
            ));
        }
        if self.confidence.z_score <= 0.0 || self.statistics.z_score <= 0.0 {
            return Err(Error::InvalidParameter(
                "z_score values must be positive".to_string(),
            ));
        }
        if self.anomaly.high_z > self.anomaly.critical_z {
            return Err(Error::InvalidParameter(
                "anomaly.high_z must not exceed anomaly.critical_z".to_string(),
            ));
        }
        if self.correlation.moderate_threshold > self.correlation.strong_threshold {
            return Err(Error::InvalidParameter(
                "correlation.moderate_threshold must not exceed strong_threshold".to_string(),
            ));
        }
        if self.correlation.top_categories < 2 {
            return Err(Error::InvalidParameter(
                "correlation.top_categories must be at least 2".to_string(),
            ));
        }
        for (name, months) in [
            ("forecast.history_years", forecast.history_years.saturating_mul(12)),
            ("forecast.weekday_lookback_months", forecast.weekday_lookback_months),
            ("correlation.months_back", self.correlation.months_back),
            (
                "statistics.monthly_lookback_months",
                self.statistics.monthly_lookback_months,
            ),
            (
                "statistics.projection_lookback_months",
                self.statistics.projection_lookback_months,
            ),
            (
                "statistics.heatmap_lookback_months",
                self.statistics.heatmap_lookback_months,
            ),
        ] {
            if months > MAX_LOOKBACK_MONTHS {
                return Err(Error::InvalidParameter(format!(
                    "{} spans {} months, more than {}",
                    name, months, MAX_LOOKBACK_MONTHS
                )));
            }
        }
        for (name, days) in [
            ("anomaly.default_days_back", self.anomaly.default_days_back),
            (
                "statistics.daily_lookback_days",
                self.statistics.daily_lookback_days,
            ),
        ] {
            if days > MAX_DAYS_BACK {
                return Err(Error::InvalidParameter(format!(
                    "{} is {} days, more than {}",
                    name, days, MAX_DAYS_BACK
                )));
            }
        }
        if self.statistics.projection_moving_average_window == 0 {
            return Err(Error::InvalidParameter(
                "statistics.projection_moving_average_window must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("config").join("engine.toml"))
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))
}
